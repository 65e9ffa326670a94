use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    Debit,
    Credit,
}

/// A published, not-yet-applied movement request.
///
/// Intents travel over the event bus keyed by `account_id`; intents for the
/// same account are delivered to a single consumer in publish order. The
/// transport is at-least-once, so a consumer may see the same intent again.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MovementIntent {
    pub account_id: String,
    pub amount: Decimal,
    pub kind: MovementKind,
}

/// Immutable audit fact, appended only after an intent was successfully
/// applied. Never updated or deleted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MovementRecord {
    pub id: Uuid,
    pub account_id: String,
    pub amount: Decimal,
    pub kind: MovementKind,
    pub applied_at: DateTime<Utc>,
}

impl MovementRecord {
    pub fn applied(intent: &MovementIntent) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: intent.account_id.clone(),
            amount: intent.amount,
            kind: intent.kind,
            applied_at: Utc::now(),
        }
    }
}
