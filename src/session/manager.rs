//! SessionManager: coordinates sessions, the dialogue engine, and the
//! optional catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogClient, OrderReceipt, OrderRequest, SlotValidator};
use crate::config::DialogueConfig;
use crate::dialogue::{
    ConversationState, DialogueEngine, Slot, TurnOutcome, Validation, prompts,
};
use crate::error::{CatalogError, SessionError};

use super::store::{Session, SessionStore};

/// Returned when a session is opened.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGreeting {
    pub session_id: Uuid,
    pub message: String,
}

/// Result of handling one user turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    /// Latest assistant message.
    pub message: Option<String>,
    /// Every assistant message produced this turn, oldest first.
    pub messages: Vec<String>,
    pub outcome: TurnOutcome,
    pub ended: bool,
    pub slots: BTreeMap<Slot, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderReceipt>,
    /// Why order submission failed, if it did. The conversation itself
    /// still completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_error: Option<String>,
}

/// Drives conversations for any number of independent sessions.
pub struct SessionManager {
    engine: DialogueEngine,
    store: Arc<SessionStore>,
    validator: Option<SlotValidator>,
}

impl SessionManager {
    pub fn new(engine: DialogueEngine, validator: Option<SlotValidator>) -> Self {
        Self {
            engine,
            store: Arc::new(SessionStore::new()),
            validator,
        }
    }

    /// Build from configuration. Passing no catalog disables validation and
    /// order submission.
    pub fn from_config(
        config: &DialogueConfig,
        catalog: Option<Arc<dyn CatalogClient>>,
    ) -> Self {
        Self::new(DialogueEngine::new(config), catalog.map(SlotValidator::new))
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn validation_enabled(&self) -> bool {
        self.validator.is_some()
    }

    /// Open a session and return the greeting to show.
    pub async fn start(&self) -> SessionGreeting {
        let session_id = self.store.create().await;
        SessionGreeting {
            session_id,
            message: prompts::GREETING.to_string(),
        }
    }

    /// Run one turn for session `id`.
    pub async fn handle_turn(&self, id: Uuid, text: &str) -> Result<TurnResponse, SessionError> {
        let handle = self
            .store
            .handle(id)
            .await
            .ok_or(SessionError::NotFound { id })?;
        let mut session = handle.lock().await;

        if session.state.ended {
            return Err(SessionError::Ended { id });
        }

        let validation = self.validation_for(&session.state, text).await;
        let state = std::mem::take(&mut session.state);
        let report = self.engine.run_turn(state, text, &validation);

        let message = report.latest_message();
        session.state = report.state;
        session.updated_at = chrono::Utc::now();

        info!(
            session_id = %id,
            outcome = ?report.outcome,
            "Turn handled"
        );

        let mut order_error = None;
        if report.outcome == TurnOutcome::Completed {
            if let Err(e) = self.submit_order(&mut session).await {
                order_error = Some(e.to_string());
            }
        }

        Ok(TurnResponse {
            session_id: id,
            message,
            messages: report.replies,
            outcome: report.outcome,
            ended: session.state.ended,
            slots: session.state.slots.clone(),
            order: session.receipt.clone(),
            order_error,
        })
    }

    /// Point-in-time copy of a session.
    pub async fn snapshot(&self, id: Uuid) -> Result<Session, SessionError> {
        self.store
            .get(id)
            .await
            .ok_or(SessionError::NotFound { id })
    }

    /// Abandon a session. Returns whether it existed.
    pub async fn abandon(&self, id: Uuid) -> bool {
        self.store.remove(id).await
    }

    /// Verdict for this turn's candidate value, if validation is enabled and
    /// a slot is pending.
    async fn validation_for(&self, state: &ConversationState, text: &str) -> Validation {
        let Some(validator) = &self.validator else {
            return Validation::Skipped;
        };
        match state.pending_slot() {
            Some(slot) if state.active_order => validator.validate(slot, text).await,
            _ => Validation::Skipped,
        }
    }

    /// Send the finished order to the catalog. No-op without a catalog.
    async fn submit_order(&self, session: &mut Session) -> Result<(), CatalogError> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };

        let (Some(item), Some(destination)) = (
            session.state.slot(Slot::Item),
            session.state.slot(Slot::Destination),
        ) else {
            return Ok(());
        };
        let order = OrderRequest {
            item: item.to_string(),
            destination: destination.to_string(),
        };

        match validator.catalog().submit_order(&order).await {
            Ok(receipt) => {
                info!(
                    session_id = %session.id,
                    order_id = receipt.order_id.as_deref().unwrap_or("-"),
                    "Order accepted"
                );
                session.receipt = Some(receipt);
                Ok(())
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Order submission failed");
                Err(e)
            }
        }
    }
}
