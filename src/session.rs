//! Recording session.
//!
//! A [`Session`] is created once per simulation. It freezes the attribute
//! registry, validates the collection layout, hands a fresh
//! [`HitsCollectionManager`] to every worker thread, and merges what the
//! workers submit at the end of the run.
//!
//! ```text
//! main thread                  worker threads
//! ───────────                  ──────────────
//! Session::builder()...build()
//!        │ worker() ─────────▶ process_step / process_event
//!        │                      ...
//!        │ ◀───────── submit(manager)
//! merged("hits")
//! ```

use crate::config::RecorderConfig;
use crate::error::{Error, Result};
use hitrec_core::{AttributeKind, AttributeValue, HitsResult, StepView};
use hitrec_engine::builtin::register_builtins;
use hitrec_engine::{AttributeRegistry, CollectionSpec, HitsCollection, HitsCollectionManager};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// A recording session shared by every worker thread.
///
/// # Example
///
/// ```ignore
/// use hitrec::prelude::*;
///
/// let session = Session::builder()
///     .config(RecorderConfig::from_file("hits.toml")?)
///     .build()?;
///
/// std::thread::scope(|s| {
///     s.spawn(|| {
///         let mut worker = session.worker()?;
///         worker.process_step(&step)?;
///         session.submit(worker);
///         Ok::<_, Error>(())
///     });
/// });
///
/// let hits = session.merged("hits")?;
/// ```
#[derive(Debug)]
pub struct Session {
    registry: Arc<AttributeRegistry>,
    specs: Vec<CollectionSpec>,
    /// Collections handed back by workers, one entry per submission
    submitted: Mutex<Vec<Vec<HitsCollection>>>,
}

impl Session {
    /// Create a builder; built-in attributes are included by default.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// The frozen attribute registry.
    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    /// Collection declarations, in order.
    pub fn specs(&self) -> &[CollectionSpec] {
        &self.specs
    }

    /// A fresh set of collections for one worker thread.
    pub fn worker(&self) -> Result<HitsCollectionManager> {
        Ok(HitsCollectionManager::with_specs(
            Arc::clone(&self.registry),
            &self.specs,
        )?)
    }

    /// Hand a worker's collections back at the end of its run.
    pub fn submit(&self, worker: HitsCollectionManager) {
        let collections = worker.into_collections();
        let rows: usize = collections.iter().map(|c| c.row_count()).sum();
        let mut submitted = self.submitted.lock();
        submitted.push(collections);
        debug!(workers = submitted.len(), rows, "worker submitted");
    }

    /// Number of submitted workers.
    pub fn submitted_workers(&self) -> usize {
        self.submitted.lock().len()
    }

    /// Concatenate collection `name` across all submitted workers.
    ///
    /// Rows keep their per-worker order; workers appear in submission order.
    ///
    /// # Errors
    /// - `CollectionNotFound` if no collection is declared under `name`
    pub fn merged(&self, name: &str) -> Result<HitsCollection> {
        let spec = self
            .specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;

        let mut merged = HitsCollection::new(
            spec.name.clone(),
            Arc::clone(&self.registry),
            spec.attributes.as_slice(),
        )?
        .with_granularity(spec.granularity);

        let submitted = self.submitted.lock();
        for part in submitted.iter().flatten().filter(|c| c.name() == name) {
            append_rows(&mut merged, part)?;
        }
        info!(
            collection = name,
            workers = submitted.len(),
            rows = merged.row_count(),
            "collection merged"
        );
        Ok(merged)
    }

    /// Drop every submitted collection, before the next run.
    pub fn clear_submitted(&self) {
        self.submitted.lock().clear();
    }
}

fn append_rows(target: &mut HitsCollection, part: &HitsCollection) -> HitsResult<()> {
    for row in 0..part.row_count() {
        target.push_row(part.row(row)?)?;
    }
    Ok(())
}

/// Builder for a [`Session`].
///
/// Registration happens here, before any worker exists; [`SessionBuilder::build`]
/// adds the built-in attributes and freezes the registry.
#[derive(Debug)]
pub struct SessionBuilder {
    registry: AttributeRegistry,
    builtins: bool,
    config: RecorderConfig,
    extra: Vec<CollectionSpec>,
}

impl SessionBuilder {
    /// Create a builder that will include the built-in attributes.
    pub fn new() -> Self {
        Self {
            registry: AttributeRegistry::new(),
            builtins: true,
            config: RecorderConfig::default(),
            extra: Vec::new(),
        }
    }

    /// Do not add the built-in attributes at build time.
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Start from `registry` instead of an empty one.
    ///
    /// Built-ins are still added for names it does not define, unless
    /// [`SessionBuilder::without_builtins`] is set.
    pub fn registry(mut self, registry: AttributeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a custom attribute.
    ///
    /// Built-ins are added only at [`SessionBuilder::build`], for names not
    /// registered here, so a custom attribute may reuse a built-in name with
    /// any kind and replaces it.
    ///
    /// # Errors
    /// - `Configuration` if `name` is empty or was already registered on this
    ///   builder with another kind
    pub fn register<F>(mut self, name: &str, kind: AttributeKind, extractor: F) -> Result<Self>
    where
        F: Fn(&dyn StepView) -> HitsResult<AttributeValue> + Send + Sync + 'static,
    {
        self.registry.register(name, kind, extractor)?;
        Ok(self)
    }

    /// Use the collections declared in `config`.
    pub fn config(mut self, config: RecorderConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a collection declared in code, after the configured ones.
    pub fn collection(mut self, spec: CollectionSpec) -> Self {
        self.extra.push(spec);
        self
    }

    /// Validate the layout and freeze the registry.
    ///
    /// Builds one throwaway manager so every attribute name, filter and
    /// filler is checked here rather than on the first worker.
    pub fn build(self) -> Result<Session> {
        if !self.config.collections.is_empty() {
            self.config.validate()?;
        }
        let mut specs = self.config.to_specs()?;
        specs.extend(self.extra);
        if specs.is_empty() {
            return Err(Error::Configuration("no collections configured".into()));
        }

        let mut registry = self.registry;
        if self.builtins {
            register_builtins(&mut registry);
        }
        let registry = Arc::new(registry);
        HitsCollectionManager::with_specs(Arc::clone(&registry), &specs)?;
        info!(
            attributes = registry.len(),
            collections = specs.len(),
            "recording session ready"
        );

        Ok(Session {
            registry,
            specs,
            submitted: Mutex::new(Vec::new()),
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
