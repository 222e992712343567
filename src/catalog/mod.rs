//! Catalog/order collaborator, the optional remote service behind slot
//! validation and order submission.
//!
//! The dialogue core never calls this directly. The session layer asks the
//! [`SlotValidator`] for a verdict before running a turn and submits the
//! finished order afterwards.

pub mod http;
pub mod validator;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub use http::HttpCatalog;
pub use validator::SlotValidator;

/// An orderable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl CatalogItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            price: None,
        }
    }
}

/// Remote verdict on a delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A completed order as sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub item: String,
    pub destination: String,
}

/// What the service returned for a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Remote catalog and order API.
///
/// Transport failures are errors. Bodies that do not parse are not: they
/// come back as an empty result (`Vec::new()`, `None`, or a receipt with no
/// fields set).
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Items currently available to order.
    async fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Ask the service whether it delivers to `destination`. `None` when
    /// the answer could not be understood.
    async fn validate_destination(
        &self,
        destination: &str,
    ) -> Result<Option<DestinationCheck>, CatalogError>;

    /// Place the order.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, CatalogError>;
}
