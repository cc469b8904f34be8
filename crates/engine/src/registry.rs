//! Attribute registry
//!
//! Maps an attribute name to the kind it produces and the extractor that reads
//! it off a transport step. The registry decouples which attributes exist from
//! which attributes a given collection wants.
//!
//! ## Sharing
//!
//! Registration happens once, before any worker starts. After that the
//! registry is wrapped in an `Arc` and only read, so every worker thread can
//! resolve names and run extractors concurrently without locking.

use hitrec_core::{
    AttributeColumn, AttributeKind, AttributeValue, HitsError, HitsResult, StepView,
};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Reads one attribute value off a step
pub type Extractor = Arc<dyn Fn(&dyn StepView) -> HitsResult<AttributeValue> + Send + Sync>;

#[derive(Clone)]
struct AttributeEntry {
    kind: AttributeKind,
    extractor: Extractor,
}

/// Name -> (kind, extractor) table
#[derive(Clone, Default)]
pub struct AttributeRegistry {
    entries: FxHashMap<String, AttributeEntry>,
    /// Registration order, for deterministic listing
    order: Vec<String>,
}

impl AttributeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in step attributes
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_builtins(&mut registry);
        debug!(attributes = registry.len(), "built-in attribute registry ready");
        registry
    }

    /// Register an attribute
    ///
    /// Registering a name that already exists with the same kind is a no-op:
    /// the first extractor stays in place.
    ///
    /// # Errors
    /// - `Configuration` if `name` is empty
    /// - `Configuration` if `name` is already registered with another kind
    pub fn register<F>(&mut self, name: &str, kind: AttributeKind, extractor: F) -> HitsResult<()>
    where
        F: Fn(&dyn StepView) -> HitsResult<AttributeValue> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(HitsError::configuration("attribute name must not be empty"));
        }

        if let Some(existing) = self.entries.get(name) {
            if existing.kind == kind {
                return Ok(());
            }
            return Err(HitsError::configuration(format!(
                "attribute '{}' already registered as {}, cannot re-register as {}",
                name, existing.kind, kind
            )));
        }

        self.insert(name, kind, Arc::new(extractor));
        Ok(())
    }

    /// Add an entry for a name known to be non-empty and absent
    pub(crate) fn insert(&mut self, name: &str, kind: AttributeKind, extractor: Extractor) {
        self.entries
            .insert(name.to_string(), AttributeEntry { kind, extractor });
        self.order.push(name.to_string());
    }

    /// Number of registered attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Kind produced by `name`
    pub fn kind_of(&self, name: &str) -> HitsResult<AttributeKind> {
        self.entry(name).map(|e| e.kind)
    }

    fn entry(&self, name: &str) -> HitsResult<&AttributeEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| HitsError::unknown_attribute(name))
    }

    /// One empty column per requested name, in the requested order
    ///
    /// # Errors
    /// - `UnknownAttribute` for the first name that was never registered
    pub fn create_columns_for<S: AsRef<str>>(&self, names: &[S]) -> HitsResult<Vec<AttributeColumn>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let kind = self.kind_of(name)?;
                Ok(AttributeColumn::new(name, kind))
            })
            .collect()
    }

    /// Run the extractor for `name` against `step`
    ///
    /// # Errors
    /// - `UnknownAttribute` if `name` is not registered
    /// - `ExtractionFailure` if the step cannot supply the value
    /// - `TypeMismatch` if the extractor produced a value of another kind
    pub fn extract(&self, name: &str, step: &dyn StepView) -> HitsResult<AttributeValue> {
        let entry = self.entry(name)?;
        let value = (entry.extractor)(step)?;
        if value.kind() != entry.kind {
            return Err(HitsError::TypeMismatch {
                attribute: name.to_string(),
                expected: entry.kind,
                actual: value.kind(),
            });
        }
        Ok(value)
    }

    /// Extract `name` from `step` and append it to `column`
    pub fn extract_and_append(
        &self,
        name: &str,
        column: &mut AttributeColumn,
        step: &dyn StepView,
    ) -> HitsResult<()> {
        let value = self.extract(name, step)?;
        column.append(value)
    }
}

impl fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.order.iter().map(|name| (name, self.entries[name].kind)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitrec_core::TrackView;
    use proptest::prelude::*;

    struct Track;

    impl TrackView for Track {
        fn particle_name(&self) -> Option<&str> {
            Some("gamma")
        }
    }

    struct Step {
        track: Track,
        edep: Option<f64>,
    }

    impl StepView for Step {
        fn track(&self) -> &dyn TrackView {
            &self.track
        }

        fn total_energy_deposit(&self) -> Option<f64> {
            self.edep
        }
    }

    fn edep(step: &dyn StepView) -> HitsResult<AttributeValue> {
        step.total_energy_deposit()
            .map(AttributeValue::Double)
            .ok_or_else(|| HitsError::extraction("edep", "no energy deposit"))
    }

    fn constant_int(_: &dyn StepView) -> HitsResult<AttributeValue> {
        Ok(AttributeValue::Int(1))
    }

    mod registration_tests {
        use super::*;

        #[test]
        fn test_register_and_lookup() {
            let mut reg = AttributeRegistry::new();
            reg.register("edep", AttributeKind::Double, edep).unwrap();
            assert!(reg.contains("edep"));
            assert_eq!(reg.kind_of("edep").unwrap(), AttributeKind::Double);
            assert_eq!(reg.len(), 1);
        }

        #[test]
        fn test_same_kind_reregistration_is_noop() {
            let mut reg = AttributeRegistry::new();
            reg.register("edep", AttributeKind::Double, edep).unwrap();
            reg.register("edep", AttributeKind::Double, |_| {
                Ok(AttributeValue::Double(99.0))
            })
            .unwrap();
            assert_eq!(reg.len(), 1);

            // first extractor kept
            let step = Step {
                track: Track,
                edep: Some(2.0),
            };
            assert_eq!(reg.extract("edep", &step).unwrap(), AttributeValue::Double(2.0));
        }

        #[test]
        fn test_conflicting_kind_fails() {
            let mut reg = AttributeRegistry::new();
            reg.register("edep", AttributeKind::Double, edep).unwrap();
            let err = reg.register("edep", AttributeKind::Int, constant_int).unwrap_err();
            assert!(matches!(err, HitsError::Configuration { .. }));
            assert_eq!(reg.kind_of("edep").unwrap(), AttributeKind::Double);
        }

        #[test]
        fn test_empty_name_rejected() {
            let mut reg = AttributeRegistry::new();
            assert!(matches!(
                reg.register("", AttributeKind::Int, constant_int),
                Err(HitsError::Configuration { .. })
            ));
        }

        #[test]
        fn test_names_in_registration_order() {
            let mut reg = AttributeRegistry::new();
            reg.register("b", AttributeKind::Int, constant_int).unwrap();
            reg.register("a", AttributeKind::Int, constant_int).unwrap();
            assert_eq!(reg.names().collect::<Vec<_>>(), vec!["b", "a"]);
        }
    }

    mod column_creation_tests {
        use super::*;

        #[test]
        fn test_unknown_attribute() {
            let mut reg = AttributeRegistry::new();
            reg.register("edep", AttributeKind::Double, edep).unwrap();
            let err = reg.create_columns_for(&["edep", "nope"]).unwrap_err();
            assert_eq!(err, HitsError::unknown_attribute("nope"));
        }

        #[test]
        fn test_extract_kind_guard() {
            let mut reg = AttributeRegistry::new();
            reg.register("liar", AttributeKind::Double, constant_int).unwrap();
            let step = Step {
                track: Track,
                edep: None,
            };
            assert!(matches!(
                reg.extract("liar", &step),
                Err(HitsError::TypeMismatch { .. })
            ));
        }

        #[test]
        fn test_extract_and_append() {
            let mut reg = AttributeRegistry::new();
            reg.register("edep", AttributeKind::Double, edep).unwrap();
            let mut cols = reg.create_columns_for(&["edep"]).unwrap();
            let step = Step {
                track: Track,
                edep: Some(1.25),
            };
            reg.extract_and_append("edep", &mut cols[0], &step).unwrap();
            assert_eq!(cols[0].values_as_double().unwrap(), &[1.25]);

            let missing = Step {
                track: Track,
                edep: None,
            };
            assert!(matches!(
                reg.extract_and_append("edep", &mut cols[0], &missing),
                Err(HitsError::ExtractionFailure { .. })
            ));
            assert!(matches!(
                reg.extract_and_append("other", &mut cols[0], &step),
                Err(HitsError::UnknownAttribute { .. })
            ));
            assert_eq!(cols[0].size(), 1);
        }
    }

    fn kind_strategy() -> impl Strategy<Value = AttributeKind> {
        prop::sample::select(AttributeKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_columns_follow_request_order(
            specs in prop::collection::btree_map("[a-z]{1,8}", kind_strategy(), 1..12),
            seed in any::<u64>(),
        ) {
            let mut reg = AttributeRegistry::new();
            for (name, kind) in &specs {
                reg.register(name, *kind, constant_int).unwrap();
            }

            let mut requested: Vec<&String> = specs.keys().collect();
            let rotation = (seed as usize) % requested.len();
            requested.rotate_left(rotation);
            let requested: Vec<&str> = requested.into_iter().map(String::as_str).collect();

            let columns = reg.create_columns_for(&requested).unwrap();
            prop_assert_eq!(columns.len(), requested.len());
            for (col, name) in columns.iter().zip(&requested) {
                prop_assert_eq!(col.name(), *name);
                prop_assert_eq!(col.kind(), specs[*name]);
            }
        }

        #[test]
        fn prop_same_kind_reregistration_idempotent(
            specs in prop::collection::btree_map("[a-z]{1,8}", kind_strategy(), 1..12),
        ) {
            let mut once = AttributeRegistry::new();
            let mut twice = AttributeRegistry::new();
            for (name, kind) in &specs {
                once.register(name, *kind, constant_int).unwrap();
                twice.register(name, *kind, constant_int).unwrap();
                twice.register(name, *kind, constant_int).unwrap();
            }
            let names: Vec<&str> = specs.keys().map(String::as_str).collect();
            prop_assert_eq!(
                once.create_columns_for(&names).unwrap(),
                twice.create_columns_for(&names).unwrap()
            );
        }
    }
}
