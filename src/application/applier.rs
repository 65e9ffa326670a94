use super::ledger::LedgerEngine;
use crate::domain::contract::Amount;
use crate::domain::movement::{MovementIntent, MovementKind, MovementRecord};
use crate::domain::ports::{AuditStoreRef, MovementHandler};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Consumes movement intents from the bus and applies them through the same
/// ledger engine the synchronous path uses.
///
/// Rejections are terminal per intent: the failure is logged, the intent is
/// discarded, and no audit record is written. There is no automatic retry
/// and no caller notification. Only after a successful application is a
/// `MovementRecord` appended to the audit store.
pub struct MovementApplier {
    ledger: Arc<LedgerEngine>,
    audit: AuditStoreRef,
}

impl MovementApplier {
    pub fn new(ledger: Arc<LedgerEngine>, audit: AuditStoreRef) -> Self {
        Self { ledger, audit }
    }
}

#[async_trait]
impl MovementHandler for MovementApplier {
    async fn handle(&self, intent: MovementIntent) -> Result<()> {
        let amount = match Amount::new(intent.amount) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(account = %intent.account_id, error = %e, "malformed movement intent discarded");
                return Ok(());
            }
        };

        let applied = match intent.kind {
            MovementKind::Debit => self.ledger.debit(&intent.account_id, amount).await,
            MovementKind::Credit => self.ledger.credit(&intent.account_id, amount).await,
        };

        match applied {
            Ok(view) => {
                self.audit.append(MovementRecord::applied(&intent)).await?;
                info!(
                    account = %intent.account_id,
                    kind = ?intent.kind,
                    outstanding_debt = %view.outstanding_debt,
                    "movement applied"
                );
                Ok(())
            }
            Err(e) if e.is_client_error() => {
                warn!(
                    account = %intent.account_id,
                    kind = ?intent.kind,
                    error = %e,
                    "movement intent rejected, discarding"
                );
                Ok(())
            }
            // Collaborator failure: surface to the bus worker, which logs
            // and drops the intent. Still no retry.
            Err(e) => Err(e),
        }
    }
}
