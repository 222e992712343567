//! HTTP catalog client.
//!
//! Talks JSON to a catalog/order service:
//! - `GET  {base}/items`
//! - `POST {base}/destinations/validate`
//! - `POST {base}/orders`

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{CatalogClient, CatalogItem, DestinationCheck, OrderReceipt, OrderRequest};
use crate::config::CatalogConfig;
use crate::error::CatalogError;

/// reqwest-backed [`CatalogClient`].
pub struct HttpCatalog {
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, CatalogError> {
        let request = match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(endpoint, e))
    }

    fn transport_error(&self, endpoint: &str, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout {
                endpoint: endpoint.to_string(),
                timeout: self.timeout,
            }
        } else {
            CatalogError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalog {
    async fn list_items(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let body = self.send("items", self.client.get(self.url("items"))).await?;
        let items = parse_items(&body);
        debug!(count = items.len(), "Catalog items fetched");
        Ok(items)
    }

    async fn validate_destination(
        &self,
        destination: &str,
    ) -> Result<Option<DestinationCheck>, CatalogError> {
        let request = self
            .client
            .post(self.url("destinations/validate"))
            .json(&serde_json::json!({ "destination": destination }));
        let body = self.send("destinations/validate", request).await?;
        Ok(parse_destination_check(&body))
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, CatalogError> {
        let request = self.client.post(self.url("orders")).json(order);
        let body = self.send("orders", request).await?;
        let receipt = parse_receipt(&body);
        info!(
            order_id = receipt.order_id.as_deref().unwrap_or("-"),
            item = %order.item,
            "Order submitted"
        );
        Ok(receipt)
    }
}

/// Item list as served: a bare array or wrapped in `{"items": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsPayload {
    List(Vec<ItemEntry>),
    Wrapped { items: Vec<ItemEntry> },
}

/// Each entry may be a full object or just the item name.
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemEntry {
    Name(String),
    Item(CatalogItem),
}

/// Parse an item list. Anything unparseable yields an empty list.
pub fn parse_items(body: &str) -> Vec<CatalogItem> {
    let payload: ItemsPayload = match serde_json::from_str(body.trim()) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Malformed catalog item list, treating as empty");
            return vec![];
        }
    };

    let entries = match payload {
        ItemsPayload::List(entries) | ItemsPayload::Wrapped { items: entries } => entries,
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            ItemEntry::Name(name) => CatalogItem::named(name),
            ItemEntry::Item(item) => item,
        })
        .filter(|item| !item.name.trim().is_empty())
        .collect()
}

/// Parse a destination verdict. `None` if the body does not carry one.
pub fn parse_destination_check(body: &str) -> Option<DestinationCheck> {
    match serde_json::from_str::<DestinationCheck>(body.trim()) {
        Ok(check) => Some(check),
        Err(e) => {
            warn!(error = %e, "Malformed destination check response");
            None
        }
    }
}

/// Parse an order receipt, keeping whatever fields are recognisable.
pub fn parse_receipt(body: &str) -> OrderReceipt {
    let value: serde_json::Value = serde_json::from_str(body.trim()).unwrap_or_else(|e| {
        warn!(error = %e, "Malformed order receipt");
        serde_json::Value::Null
    });

    let order_id = value.get("order_id").and_then(|v| match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let status = value
        .get("status")
        .and_then(|v| v.as_str())
        .map(String::from);

    OrderReceipt {
        order_id,
        status,
        submitted_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_items_bare_array() {
        let items = parse_items(r#"[{"name": "Margherita", "price": "8.50"}, {"name": "Funghi"}]"#);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Margherita");
        assert_eq!(items[0].price.as_deref(), Some("8.50"));
        assert!(items[1].description.is_none());
    }

    #[test]
    fn parse_items_wrapped_and_plain_names() {
        let items = parse_items(r#"{"items": ["Margherita", {"name": "Diavola"}, "  "]}"#);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Margherita", "Diavola"]);
    }

    #[test]
    fn parse_items_malformed_is_empty() {
        assert!(parse_items("").is_empty());
        assert!(parse_items("<html>502 Bad Gateway</html>").is_empty());
        assert!(parse_items(r#"{"menu": []}"#).is_empty());
        assert!(parse_items(r#"[{"title": "no name"}]"#).is_empty());
    }

    #[test]
    fn parse_destination_check_variants() {
        let check = parse_destination_check(r#"{"valid": false, "reason": "Out of range."}"#);
        assert_eq!(
            check,
            Some(DestinationCheck {
                valid: false,
                reason: Some("Out of range.".to_string()),
            })
        );
        assert_eq!(
            parse_destination_check(r#"{"valid": true}"#).map(|c| c.valid),
            Some(true)
        );
        assert!(parse_destination_check("yes").is_none());
    }

    #[test]
    fn parse_receipt_accepts_numeric_ids() {
        let receipt = parse_receipt(r#"{"order_id": 42, "status": "accepted"}"#);
        assert_eq!(receipt.order_id.as_deref(), Some("42"));
        assert_eq!(receipt.status.as_deref(), Some("accepted"));
    }

    #[test]
    fn parse_receipt_malformed_is_empty() {
        let receipt = parse_receipt("ok");
        assert!(receipt.order_id.is_none());
        assert!(receipt.status.is_none());
    }

    #[test]
    fn urls_join_without_double_slash() {
        let catalog = HttpCatalog::new(&CatalogConfig::new("http://localhost:9000/api/")).unwrap();
        assert_eq!(catalog.base_url(), "http://localhost:9000/api");
        assert_eq!(catalog.url("items"), "http://localhost:9000/api/items");
    }
}
