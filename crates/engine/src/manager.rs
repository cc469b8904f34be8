//! Per-worker hits collection manager
//!
//! Each worker thread owns one `HitsCollectionManager`. It holds the worker's
//! collections in declaration order and routes transport callbacks to them:
//!
//! ```text
//! process_step(step) / process_event(event)
//!   1. for each primary collection of that granularity whose filter accepts:
//!        extract_row(step)       -> pending row (nothing recorded yet)
//!   2. for each pending row:
//!        push_row                -> one new row
//!        for each derived collection of it:
//!          own filter rejects?   -> skip
//!          filler.fill(row)      -> copy of the new row's selected columns
//! ```
//!
//! A step is atomic across the worker's collections. Every accepted row is
//! extracted before any collection is touched, so an extraction failure in one
//! collection leaves all of them as they were. If recording itself fails, the
//! rows already added for the step are truncated away again.

use crate::collection::{Granularity, HitsCollection};
use crate::filler::AttributeFiller;
use crate::filter::AcceptanceFilter;
use crate::registry::AttributeRegistry;
use hitrec_core::{AttributeValue, HitsError, HitsResult, StepView};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Declaration of one collection
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    /// Collection name, unique per manager
    pub name: String,
    /// Requested attributes, in column order
    pub attributes: Vec<String>,
    /// Step- or event-level recording
    pub granularity: Granularity,
    /// Optional acceptance filter
    pub filter: Option<Arc<dyn AcceptanceFilter>>,
    /// Source collection, for derived collections fed by a filler
    pub source: Option<String>,
}

impl CollectionSpec {
    /// Step-level collection without filter
    pub fn new<S: AsRef<str>>(name: impl Into<String>, attributes: &[S]) -> Self {
        Self {
            name: name.into(),
            attributes: attributes.iter().map(|a| a.as_ref().to_string()).collect(),
            granularity: Granularity::Step,
            filter: None,
            source: None,
        }
    }

    /// Set the granularity
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set the acceptance filter
    pub fn filter(mut self, filter: Arc<dyn AcceptanceFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Feed this collection from `source` instead of from steps
    pub fn derived_from(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug)]
struct Slot {
    collection: HitsCollection,
    filter: Option<Arc<dyn AcceptanceFilter>>,
    /// Filler from the source slot; set on derived slots only
    filler: Option<AttributeFiller>,
    /// Positions of slots derived from this one
    derived: Vec<usize>,
}

impl Slot {
    fn accepts(&self, step: &dyn StepView) -> bool {
        self.filter.as_ref().map_or(true, |f| f.accept_step(step))
    }
}

/// The collections one worker thread records into
#[derive(Debug)]
pub struct HitsCollectionManager {
    registry: Arc<AttributeRegistry>,
    slots: Vec<Slot>,
    index: FxHashMap<String, usize>,
}

impl HitsCollectionManager {
    /// Create an empty manager resolving attributes against `registry`
    pub fn new(registry: Arc<AttributeRegistry>) -> Self {
        Self {
            registry,
            slots: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Create a manager and add every spec in order
    pub fn with_specs<'a>(
        registry: Arc<AttributeRegistry>,
        specs: impl IntoIterator<Item = &'a CollectionSpec>,
    ) -> HitsResult<Self> {
        let mut manager = Self::new(registry);
        for spec in specs {
            manager.add(spec.clone())?;
        }
        info!(collections = manager.len(), "hits collection manager ready");
        Ok(manager)
    }

    /// Add a collection
    ///
    /// A derived collection must name a source added earlier, which is not
    /// itself derived and has the same granularity.
    ///
    /// # Errors
    /// - `Configuration` for duplicate names or an invalid source
    /// - any error from collection or filler construction
    pub fn add(&mut self, spec: CollectionSpec) -> HitsResult<()> {
        if self.index.contains_key(&spec.name) {
            return Err(HitsError::configuration(format!(
                "collection '{}' declared twice",
                spec.name
            )));
        }

        let collection = HitsCollection::new(
            spec.name.clone(),
            Arc::clone(&self.registry),
            spec.attributes.as_slice(),
        )?
        .with_granularity(spec.granularity);

        let (source_pos, filler) = match &spec.source {
            None => (None, None),
            Some(source) => {
                let pos = self.resolve_source(&spec, source)?;
                let filler = AttributeFiller::new(
                    &self.slots[pos].collection,
                    &collection,
                    spec.attributes.as_slice(),
                )?;
                (Some(pos), Some(filler))
            }
        };

        let pos = self.slots.len();
        if let Some(source_pos) = source_pos {
            self.slots[source_pos].derived.push(pos);
        }
        debug!(
            collection = %spec.name,
            source = ?spec.source,
            granularity = ?spec.granularity,
            "collection added"
        );
        self.slots.push(Slot {
            collection,
            filter: spec.filter,
            filler,
            derived: Vec::new(),
        });
        self.index.insert(spec.name, pos);
        Ok(())
    }

    fn resolve_source(&self, spec: &CollectionSpec, source: &str) -> HitsResult<usize> {
        let pos = *self.index.get(source).ok_or_else(|| {
            HitsError::configuration(format!(
                "collection '{}' derives from unknown collection '{}'",
                spec.name, source
            ))
        })?;
        let slot = &self.slots[pos];
        if slot.filler.is_some() {
            return Err(HitsError::configuration(format!(
                "collection '{}' derives from '{}', which is itself derived",
                spec.name, source
            )));
        }
        if slot.collection.granularity() != spec.granularity {
            return Err(HitsError::configuration(format!(
                "collection '{}' and its source '{}' differ in granularity",
                spec.name, source
            )));
        }
        Ok(pos)
    }

    /// Shared registry
    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Collection by name
    pub fn get(&self, name: &str) -> Option<&HitsCollection> {
        self.index.get(name).map(|&i| &self.slots[i].collection)
    }

    /// Collections in declaration order
    pub fn collections(&self) -> impl Iterator<Item = &HitsCollection> {
        self.slots.iter().map(|s| &s.collection)
    }

    /// Record `step` into every step-level collection
    ///
    /// Returns the number of rows recorded across all collections.
    pub fn process_step(&mut self, step: &dyn StepView) -> HitsResult<usize> {
        self.process(Granularity::Step, step)
    }

    /// Record an end-of-event view into every event-level collection
    ///
    /// Returns the number of rows recorded across all collections.
    pub fn process_event(&mut self, event: &dyn StepView) -> HitsResult<usize> {
        self.process(Granularity::Event, event)
    }

    fn process(&mut self, granularity: Granularity, step: &dyn StepView) -> HitsResult<usize> {
        let mut pending = Vec::new();
        for (pos, slot) in self.slots.iter().enumerate() {
            if slot.filler.is_some()
                || slot.collection.granularity() != granularity
                || !slot.accepts(step)
            {
                continue;
            }
            pending.push((pos, slot.collection.extract_row(step)?));
        }
        if pending.is_empty() {
            return Ok(0);
        }

        let marks: Vec<usize> = self.slots.iter().map(|s| s.collection.row_count()).collect();
        let mut recorded = 0;
        for (pos, values) in pending {
            match self.record(pos, values, step) {
                Ok(rows) => recorded += rows,
                Err(e) => {
                    for (slot, &rows) in self.slots.iter_mut().zip(&marks) {
                        slot.collection.truncate(rows);
                    }
                    return Err(e);
                }
            }
        }
        Ok(recorded)
    }

    fn record(
        &mut self,
        pos: usize,
        values: Vec<AttributeValue>,
        step: &dyn StepView,
    ) -> HitsResult<usize> {
        self.slots[pos].collection.push_row(values)?;
        let row = self.slots[pos].collection.row_count() - 1;
        let mut recorded = 1;

        // derived slots always come after their source
        let (head, tail) = self.slots.split_at_mut(pos + 1);
        let source = &head[pos];
        for &d in &source.derived {
            let target = &mut tail[d - pos - 1];
            if !target.accepts(step) {
                continue;
            }
            if let Some(filler) = &target.filler {
                filler.fill(&source.collection, &mut target.collection, row)?;
                recorded += 1;
            }
        }
        Ok(recorded)
    }

    /// Clear every collection, at a run boundary
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.collection.reset();
        }
    }

    /// Give up the collections, in declaration order
    pub fn into_collections(self) -> Vec<HitsCollection> {
        self.slots.into_iter().map(|s| s.collection).collect()
    }
}
