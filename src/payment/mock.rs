//! In-process provider for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use crate::payment::{amount_due, CheckoutSession, LineItem, PaymentError, PaymentProvider, PaymentStatus, SessionStatus};

#[derive(Debug, Clone)]
struct MockSession {
    client_reference: String,
    status: PaymentStatus,
    items: Vec<LineItem>,
    amount_total: i64,
}

/// Sessions start unpaid unless `auto_pay` is set; tests flip them with [`mark_paid`](Self::mark_paid).
#[derive(Debug, Default)]
pub struct MockPaymentProvider {
    sessions: Mutex<HashMap<String, MockSession>>,
    auto_pay: bool,
    failing: bool,
}

impl MockPaymentProvider {
    pub fn new() -> Self { Self::default() }

    /// Every created session is immediately paid. Used by the dev server.
    pub fn auto_paying() -> Self { Self { auto_pay: true, ..Self::default() } }

    /// Every call fails as if the provider were down.
    pub fn failing() -> Self { Self { failing: true, ..Self::default() } }

    pub fn mark_paid(&self, session_id: &str) -> bool {
        match self.sessions.lock() {
            Ok(mut sessions) => sessions.get_mut(session_id).map(|s| s.status = PaymentStatus::Paid).is_some(),
            Err(_) => false,
        }
    }

    /// Line items submitted for a session.
    pub fn items(&self, session_id: &str) -> Option<Vec<LineItem>> {
        self.sessions.lock().ok()?.get(session_id).map(|s| s.items.clone())
    }

    fn sessions(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, MockSession>>, PaymentError> {
        if self.failing { return Err(PaymentError::Transport("mock provider offline".into())); }
        self.sessions.lock().map_err(|_| PaymentError::Transport("mock provider poisoned".into()))
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(&self, items: &[LineItem], client_reference: &str) -> Result<CheckoutSession, PaymentError> {
        let session_id = format!("cs_mock_{}", Uuid::new_v4().simple());
        let status = if self.auto_pay { PaymentStatus::Paid } else { PaymentStatus::Unpaid };
        let amount_total = amount_due(LineItem::priced(items))?;
        self.sessions()?.insert(session_id.clone(), MockSession {
            client_reference: client_reference.to_string(),
            status,
            items: items.to_vec(),
            amount_total,
        });
        tracing::info!(session_id = %session_id, lines = items.len(), "Mock checkout session created");
        Ok(CheckoutSession { url: format!("https://checkout.invalid/pay/{session_id}"), session_id })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, PaymentError> {
        let sessions = self.sessions()?;
        let session = sessions.get(session_id).ok_or_else(|| PaymentError::UnknownSession(session_id.to_string()))?;
        Ok(SessionStatus {
            id: session_id.to_string(),
            status: session.status,
            client_reference: Some(session.client_reference.clone()),
            amount_total: Some(session.amount_total),
        })
    }
}
