use super::gateway::validated_account;
use crate::domain::contract::Amount;
use crate::domain::movement::{MovementIntent, MovementKind};
use crate::domain::ports::EventBusRef;
use crate::error::Result;
use rust_decimal::Decimal;
use tracing::info;

/// Accepts a movement request and publishes it as an intent.
///
/// Returns as soon as the bus has accepted the intent; it does not wait for,
/// and cannot report, the eventual outcome of application. Input is
/// validated up front so only well-formed intents ever reach the bus —
/// acceptance here still is not proof of application, since the applier may
/// reject on the ledger invariant.
pub struct MovementIntake {
    bus: EventBusRef,
}

impl MovementIntake {
    pub fn new(bus: EventBusRef) -> Self {
        Self { bus }
    }

    /// `Ok(())` is the acceptance acknowledgement.
    pub async fn submit(
        &self,
        account_id: &str,
        amount: Decimal,
        kind: MovementKind,
    ) -> Result<()> {
        let account_id = validated_account(account_id)?;
        let amount = Amount::new(amount)?;

        let intent = MovementIntent {
            account_id: account_id.to_string(),
            amount: amount.value(),
            kind,
        };
        info!(account = %intent.account_id, kind = ?intent.kind, amount = %intent.amount, "publishing movement intent");
        self.bus.publish(intent).await
    }
}
