use crate::domain::movement::MovementIntent;
use crate::domain::ports::{EventBus, MovementHandler, MovementHandlerRef};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

/// In-process event bus with per-account ordered delivery.
///
/// Intents are hashed by account id onto one of N shard workers, each a
/// dedicated task draining its own channel: all intents for one account land
/// on the same worker and are handled one at a time in publish order. No
/// ordering holds across accounts. Handler failures are logged and the
/// intent is dropped; the bus never redelivers.
pub struct ShardedBus {
    shards: Vec<mpsc::UnboundedSender<MovementIntent>>,
}

impl ShardedBus {
    /// Spawns the shard workers and returns the publisher handle alongside
    /// the worker set. The workers run until every clone of the publisher
    /// handle has been dropped, then drain their backlog and exit.
    pub fn start(shard_count: usize, handler: MovementHandlerRef) -> (Arc<Self>, ShardWorkers) {
        let shard_count = shard_count.max(1);
        let mut shards = Vec::with_capacity(shard_count);
        let mut handles = Vec::with_capacity(shard_count);

        for shard in 0..shard_count {
            let (tx, rx) = mpsc::unbounded_channel();
            shards.push(tx);
            handles.push(tokio::spawn(run_worker(shard, rx, handler.clone())));
        }

        (Arc::new(Self { shards }), ShardWorkers { handles })
    }

    fn shard_for(&self, account_id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        account_id.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}

#[async_trait]
impl EventBus for ShardedBus {
    async fn publish(&self, intent: MovementIntent) -> Result<()> {
        let shard = self.shard_for(&intent.account_id);
        self.shards[shard]
            .send(intent)
            .map_err(|e| LedgerError::Internal(Box::new(e)))
    }
}

async fn run_worker(
    shard: usize,
    mut rx: mpsc::UnboundedReceiver<MovementIntent>,
    handler: Arc<dyn MovementHandler>,
) {
    while let Some(intent) = rx.recv().await {
        let account_id = intent.account_id.clone();
        if let Err(e) = handler.handle(intent).await {
            error!(shard, account = %account_id, error = %e, "movement handler failed; intent discarded");
        }
    }
}

/// Join handles for the shard workers. Awaiting it after the last publisher
/// handle is gone drains the bus completely.
pub struct ShardWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl ShardWorkers {
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
