//! Injected mapping from [`BiologistId`] to running engines.
//!
//! The registry is owned by whatever serves requests (a transport layer,
//! the engine binary, a test). The core never reaches into a global one.

use std::collections::BTreeMap;
use std::sync::Arc;

use biologist_types::BiologistId;
use tokio::sync::RwLock;
use tracing::info;

use crate::biologist::Biologist;

/// Errors returned by [`Registry`] lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No engine is registered under the id.
    #[error("no biologist registered with id {id}")]
    NotFound {
        /// The id that was looked up.
        id: BiologistId,
    },
}

/// Engines keyed by id.
#[derive(Debug, Default)]
pub struct Registry {
    biologists: RwLock<BTreeMap<BiologistId, Arc<Biologist>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine and return the shared handle.
    pub async fn add(&self, biologist: Biologist) -> Arc<Biologist> {
        let id = biologist.id();
        let biologist = Arc::new(biologist);
        let mut biologists = self.biologists.write().await;
        biologists.insert(id, Arc::clone(&biologist));
        info!(%id, registered = biologists.len(), "Biologist registered");
        biologist
    }

    /// Look up an engine by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if nothing is registered under
    /// `id`.
    pub async fn get(&self, id: BiologistId) -> Result<Arc<Biologist>, RegistryError> {
        self.biologists
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound { id })
    }

    /// Unregister an engine, stopping it first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if nothing is registered under
    /// `id`.
    pub async fn remove(&self, id: BiologistId) -> Result<Arc<Biologist>, RegistryError> {
        let removed = self
            .biologists
            .write()
            .await
            .remove(&id)
            .ok_or(RegistryError::NotFound { id })?;
        removed.stop().await;
        info!(%id, "Biologist removed");
        Ok(removed)
    }

    /// Number of registered engines.
    pub async fn len(&self) -> usize {
        self.biologists.read().await.len()
    }

    /// Whether no engine is registered.
    pub async fn is_empty(&self) -> bool {
        self.biologists.read().await.is_empty()
    }

    /// Ids of every registered engine, in ascending order.
    pub async fn ids(&self) -> Vec<BiologistId> {
        self.biologists.read().await.keys().copied().collect()
    }

    /// Stop every registered engine. Engines stay registered and queryable.
    pub async fn stop_all(&self) {
        let biologists: Vec<Arc<Biologist>> =
            self.biologists.read().await.values().cloned().collect();
        for biologist in &biologists {
            biologist.stop().await;
        }
        info!(stopped = biologists.len(), "All biologists stopped");
    }
}
