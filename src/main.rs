use clap::Parser;
use creditline::application::applier::MovementApplier;
use creditline::application::gateway::SynchronousGateway;
use creditline::application::intake::MovementIntake;
use creditline::application::ledger::LedgerEngine;
use creditline::domain::movement::MovementKind;
use creditline::domain::ports::{AuditStoreRef, ContractStoreRef, MovementHandlerRef};
use creditline::error::LedgerError;
use creditline::infrastructure::bus::ShardedBus;
use creditline::infrastructure::in_memory::{InMemoryAuditStore, InMemoryContractStore};
use creditline::interfaces::csv::operation_reader::{Operation, OperationKind, OperationReader};
use creditline::interfaces::csv::view_writer::ViewWriter;
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Number of event-bus shard workers
    #[arg(long, default_value_t = 4)]
    shards: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let (contracts, audit) = open_stores(cli.db_path)?;

    let ledger = Arc::new(LedgerEngine::new(contracts));
    let gateway = SynchronousGateway::new(ledger.clone());
    let applier: MovementHandlerRef = Arc::new(MovementApplier::new(ledger, audit));
    let (bus, workers) = ShardedBus::start(cli.shards, applier);
    let intake = MovementIntake::new(bus);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    let mut accounts = BTreeSet::new();
    for result in reader.operations() {
        match result {
            Ok(op) => {
                accounts.insert(op.account.clone());
                if let Err(e) = run_operation(&gateway, &intake, &op).await {
                    tracing::error!(account = %op.account, op = ?op.op, error = %e, "operation failed");
                }
            }
            Err(e) => tracing::error!(error = %e, "skipping malformed operation"),
        }
    }

    // Drop the only publisher handle so the shard workers drain their
    // backlog and exit; only then is the final state stable.
    drop(intake);
    workers.join().await;

    let mut views = Vec::new();
    for account in accounts {
        match gateway.contract(&account).await {
            Ok(view) => views.push(view),
            // Cancelled, or every operation on it failed.
            Err(LedgerError::NotFound(_)) => {}
            Err(e) => return Err(e).into_diagnostic(),
        }
    }

    let stdout = io::stdout();
    let mut writer = ViewWriter::new(stdout.lock());
    writer.write_views(views).into_diagnostic()?;

    Ok(())
}

async fn run_operation(
    gateway: &SynchronousGateway,
    intake: &MovementIntake,
    op: &Operation,
) -> creditline::error::Result<()> {
    match op.op {
        OperationKind::Create => {
            gateway.create_contract(&op.account, required_amount(op)?).await?;
        }
        OperationKind::Get => {
            gateway.contract(&op.account).await?;
        }
        OperationKind::AlterLimit => {
            gateway.alter_limit(&op.account, required_amount(op)?).await?;
        }
        OperationKind::Cancel => {
            gateway.cancel_contract(&op.account).await?;
        }
        OperationKind::Debit => {
            gateway.debit(&op.account, required_amount(op)?).await?;
        }
        OperationKind::Credit => {
            gateway.credit(&op.account, required_amount(op)?).await?;
        }
        OperationKind::SubmitDebit => {
            intake
                .submit(&op.account, required_amount(op)?, MovementKind::Debit)
                .await?;
        }
        OperationKind::SubmitCredit => {
            intake
                .submit(&op.account, required_amount(op)?, MovementKind::Credit)
                .await?;
        }
    }
    Ok(())
}

fn required_amount(op: &Operation) -> creditline::error::Result<rust_decimal::Decimal> {
    op.amount
        .ok_or_else(|| LedgerError::InvalidInput(format!("{:?} requires an amount", op.op)))
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(ContractStoreRef, AuditStoreRef)> {
    use creditline::infrastructure::rocksdb::RocksDbStore;

    match db_path {
        Some(path) => {
            let store = RocksDbStore::open(path).into_diagnostic()?;
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(ContractStoreRef, AuditStoreRef)> {
    if db_path.is_some() {
        return Err(miette::miette!(
            "--db-path requires building with the storage-rocksdb feature"
        ));
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (ContractStoreRef, AuditStoreRef) {
    (
        Arc::new(InMemoryContractStore::new()),
        Arc::new(InMemoryAuditStore::new()),
    )
}
