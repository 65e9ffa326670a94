//! Randomized soak: whatever sequence of movements the ledger accepts, the
//! debt invariant must hold afterwards.

mod common;

use common::Pipeline;
use creditline::domain::movement::MovementKind;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread")]
async fn test_random_movement_soak_preserves_invariant() {
    let pipeline = Pipeline::start(4);
    let accounts = ["acc-a", "acc-b", "acc-c"];
    for account in accounts {
        pipeline
            .gateway
            .create_contract(account, dec!(250.00))
            .await
            .unwrap();
    }

    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let account = accounts[rng.gen_range(0..accounts.len())];
        let amount = Decimal::from(rng.gen_range(1..400u32));
        let debit = rng.gen_bool(0.5);

        // Alternate randomly between the two entry points.
        if rng.gen_bool(0.5) {
            let result = if debit {
                pipeline.gateway.debit(account, amount).await
            } else {
                pipeline.gateway.credit(account, amount).await
            };
            if let Ok(view) = result {
                assert!(view.outstanding_debt >= Decimal::ZERO);
                assert!(view.outstanding_debt <= view.limit_amount);
            }
        } else {
            let kind = if debit {
                MovementKind::Debit
            } else {
                MovementKind::Credit
            };
            pipeline.intake.submit(account, amount, kind).await.unwrap();
        }
    }

    let (gateway, _audit) = pipeline.drain().await;
    for account in accounts {
        let view = gateway.contract(account).await.unwrap();
        assert!(view.outstanding_debt >= Decimal::ZERO);
        assert!(view.outstanding_debt <= view.limit_amount);
    }
}
