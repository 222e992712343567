//! Turns catalog answers into per-turn [`Validation`] verdicts.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{CatalogClient, CatalogItem};
use crate::dialogue::{Slot, Validation, slot_value};

/// Resolves verdicts for candidate slot values against the catalog.
///
/// Every failure mode degrades to [`Validation::Skipped`]: an unreachable
/// service, an empty menu, or an answer that could not be parsed.
pub struct SlotValidator {
    catalog: Arc<dyn CatalogClient>,
    menu: RwLock<Option<Vec<CatalogItem>>>,
}

impl SlotValidator {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog,
            menu: RwLock::new(None),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    /// Verdict for `candidate` as the value of `slot`. The value checked is
    /// exactly the one the slot would receive.
    pub async fn validate(&self, slot: Slot, candidate: &str) -> Validation {
        if candidate.trim().is_empty() {
            return Validation::Skipped;
        }
        let value = slot_value(candidate);
        match slot {
            Slot::Item => self.validate_item(&value).await,
            Slot::Destination => self.validate_destination(&value).await,
        }
    }

    async fn validate_item(&self, candidate: &str) -> Validation {
        let menu = self.menu().await;
        if menu.is_empty() {
            return Validation::Skipped;
        }

        if menu
            .iter()
            .any(|item| item.name.trim().to_lowercase() == candidate)
        {
            Validation::Accepted
        } else {
            let names: Vec<&str> = menu.iter().map(|item| item.name.as_str()).collect();
            Validation::Rejected {
                reason: Some(format!("We have: {}.", names.join(", "))),
            }
        }
    }

    async fn validate_destination(&self, candidate: &str) -> Validation {
        match self.catalog.validate_destination(candidate).await {
            Ok(Some(check)) if check.valid => Validation::Accepted,
            Ok(Some(check)) => Validation::Rejected {
                reason: check.reason,
            },
            Ok(None) => Validation::Skipped,
            Err(e) => {
                warn!(error = %e, "Destination validation unavailable, skipping");
                Validation::Skipped
            }
        }
    }

    /// Cached menu, fetched on first use. Empty or failed fetches are not
    /// cached so a later turn can try again.
    async fn menu(&self) -> Vec<CatalogItem> {
        if let Some(menu) = self.menu.read().await.as_ref() {
            return menu.clone();
        }

        match self.catalog.list_items().await {
            Ok(items) if !items.is_empty() => {
                debug!(count = items.len(), "Menu cached");
                *self.menu.write().await = Some(items.clone());
                items
            }
            Ok(_) => {
                warn!("Catalog returned no items, skipping item validation");
                vec![]
            }
            Err(e) => {
                warn!(error = %e, "Item list unavailable, skipping item validation");
                vec![]
            }
        }
    }
}
