use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payguard::application::engine::EscrowEngine;
use payguard::domain::ports::{LedgerStoreBox, TransferGatewayBox};
use payguard::domain::project::Address;
use payguard::infrastructure::in_memory::{InMemoryGateway, InMemoryLedger};
use payguard::interfaces::csv::operation_reader::OperationReader;
use payguard::interfaces::csv::project_writer::ProjectWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent ledger (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Administrator identity for arbitration
    #[arg(long, default_value = "0x1")]
    admin: Address,
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_ledger(path: PathBuf) -> Result<LedgerStoreBox> {
    use payguard::infrastructure::rocksdb::RocksDbLedger;
    let ledger = RocksDbLedger::open(path).into_diagnostic()?;
    Ok(Box::new(ledger))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_ledger(_path: PathBuf) -> Result<LedgerStoreBox> {
    eprintln!(
        "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
    );
    Ok(Box::new(InMemoryLedger::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ledger: LedgerStoreBox = match cli.db_path {
        Some(db_path) => persistent_ledger(db_path)?,
        None => Box::new(InMemoryLedger::new()),
    };
    let gateway: TransferGatewayBox = Box::new(InMemoryGateway::new());

    let engine = EscrowEngine::new(ledger, gateway, cli.admin);

    // Replay operations
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for record_result in reader.operations() {
        match record_result {
            Ok(record) => {
                if let Err(e) = record.apply(&engine).await {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Collect final state from engine
    let projects = engine.into_results().await.into_diagnostic()?;

    // Output final state
    let stdout = io::stdout();
    let mut writer = ProjectWriter::new(stdout.lock());
    writer.write_projects(projects).into_diagnostic()?;

    Ok(())
}
