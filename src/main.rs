//! Roster - student records with filtered CSV and ZIP export
//!
//! # Usage
//!
//! ```bash
//! roster add --name "Alice" --email alice@example.com
//! roster list --name ali
//! roster export --email example.com --format zip --output ./exports
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use roster::cli::{CliInterface, Commands, commands};
use roster::config::Config;
use roster::connection::ConnectionManager;
use roster::error::Result;
use roster::formatter::Formatter;
use roster::store::MongoRecordStore;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Empty results and missing input are outcomes, not failures
        if e.is_user_facing() {
            eprintln!("{}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle local subcommands (version, completion, config)
/// 4. Connect to MongoDB and run the store-backed command
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(cli.config());

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let config = cli.config();
    config.validate()?;

    // Reject a filtered export without filter values before connecting
    if let Commands::Export(args) = cli.command() {
        args.to_request(config.export.default_format).validate()?;
    }

    let mut manager = ConnectionManager::new(config.connection.clone());
    manager.connect().await?;

    let result = run_store_command(&cli, &manager).await;

    manager.disconnect().await?;
    result
}

/// Run a command that needs the record store
async fn run_store_command(cli: &CliInterface, manager: &ConnectionManager) -> Result<()> {
    let config = cli.config();

    let command = cli.command();
    if let Commands::Status = command {
        println!("{}", commands::connection_status(manager).await?);
        return Ok(());
    }

    let store = Arc::new(open_store(manager, config).await?);
    let formatter = Formatter::new(config.display.format, config.display.color_output);

    match command {
        Commands::Add { name, email } => {
            let record = commands::add_record(store.as_ref(), &name, &email).await?;
            println!("{}", formatter.format_record(&record)?);
        }
        Commands::List(args) => {
            let records = commands::list_records(store.as_ref(), &args.filters()).await?;
            println!("{}", formatter.format_records(&records)?);
        }
        Commands::Export(args) => {
            let request = args.to_request(config.export.default_format);
            let sink = args.sink(config);
            let summary =
                commands::run_export(store, &request, sink.as_ref(), cancel_on_ctrl_c()).await?;
            eprintln!("{}", summary);
        }
        other => debug!("{:?} needs no store", other),
    }

    Ok(())
}

/// Open the record store on the connected database
async fn open_store(manager: &ConnectionManager, config: &Config) -> Result<MongoRecordStore> {
    let store = MongoRecordStore::new(
        &manager.database()?,
        &config.connection.collection,
        &config.connection.counters_collection,
    );
    store.ensure_indexes().await?;
    Ok(store)
}

/// Cancellation token triggered by Ctrl+C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => trigger.cancel(),
            Err(err) => error!("Failed to listen for Ctrl+C: {}", err),
        }
    });

    token
}

/// Initialize logging system
///
/// Logs go to stderr so that `export --stdout` output stays clean.
///
/// # Arguments
/// * `config` - Effective configuration (CLI verbosity already applied)
fn initialize_logging(config: &Config) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(config.logging.level.to_tracing_level())
        .with_target(false)
        .with_ansi(config.display.color_output)
        .with_writer(std::io::stderr);

    if config.logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
