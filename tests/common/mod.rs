#![allow(dead_code)]

use creditline::application::applier::MovementApplier;
use creditline::application::gateway::SynchronousGateway;
use creditline::application::intake::MovementIntake;
use creditline::application::ledger::LedgerEngine;
use creditline::domain::ports::MovementHandlerRef;
use creditline::infrastructure::bus::{ShardWorkers, ShardedBus};
use creditline::infrastructure::in_memory::{InMemoryAuditStore, InMemoryContractStore};
use std::sync::Arc;

/// Both entry points wired against shared in-memory collaborators.
pub struct Pipeline {
    pub gateway: SynchronousGateway,
    pub intake: MovementIntake,
    pub audit: Arc<InMemoryAuditStore>,
    workers: ShardWorkers,
}

impl Pipeline {
    pub fn start(shards: usize) -> Self {
        let store = Arc::new(InMemoryContractStore::new());
        let ledger = Arc::new(LedgerEngine::new(store));
        let audit = Arc::new(InMemoryAuditStore::new());
        let handler: MovementHandlerRef =
            Arc::new(MovementApplier::new(ledger.clone(), audit.clone()));
        let (bus, workers) = ShardedBus::start(shards, handler);

        Self {
            gateway: SynchronousGateway::new(ledger),
            intake: MovementIntake::new(bus),
            audit,
            workers,
        }
    }

    /// Stops publishing and waits for the shard workers to drain, then hands
    /// back the synchronous side for final-state assertions.
    pub async fn drain(self) -> (SynchronousGateway, Arc<InMemoryAuditStore>) {
        let Pipeline {
            gateway,
            intake,
            audit,
            workers,
        } = self;
        drop(intake);
        workers.join().await;
        (gateway, audit)
    }
}

pub fn gateway() -> Arc<SynchronousGateway> {
    let store = Arc::new(InMemoryContractStore::new());
    Arc::new(SynchronousGateway::new(Arc::new(LedgerEngine::new(store))))
}
