//! Device registry CLI
//!
//! Command-line front end for the local device list and its account sync.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use device_registry::command::{execute, Command, CommandOutput};
use device_registry::notifier::LogNotifier;
use device_registry::ownership::OwnershipMap;
use device_registry::prompt::{AcknowledgePrompt, RemovalPrompt, TerminalPrompt};
use device_registry::{load_config, open_registry, Config, MutationOutcome};
use tracing::Level;

#[derive(Parser)]
#[command(name = "device-registry")]
#[command(about = "Local device list synchronized with an account")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store file (overrides config file)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Account device endpoint; implies an authenticated session
    #[arg(long)]
    endpoint: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Print rows as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Show the device list
    List,
    /// Add a device
    Add {
        key: String,
        /// Model label cached for the badge
        #[arg(long)]
        info: Option<String>,
    },
    /// Remove a device
    Remove {
        key: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Attach a listed device to the signed-in account
    Claim { key: String },
    /// Set the local display name of a device
    Name { key: String, name: String },
    /// Check whether a device is listed
    Contains { key: String },
    /// Merge an ownership map file into the list
    Merge { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, store={:?}, endpoint={:?}, action={:?}",
        args.config,
        args.store,
        args.endpoint,
        args.action
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(store) = args.store {
        config.storage.path = store;
    }
    if let Some(endpoint) = args.endpoint {
        config.sync.endpoint = endpoint;
        config.sync.authenticated = true;
    }

    let prompt: Arc<dyn RemovalPrompt> = match &args.action {
        Action::Remove { yes: false, .. } => Arc::new(TerminalPrompt::new(
            std::io::BufReader::new(std::io::stdin()),
            std::io::stderr(),
        )),
        _ => Arc::new(AcknowledgePrompt),
    };

    let registry = open_registry(&config, Arc::new(LogNotifier), prompt)?;

    let command = match args.action {
        Action::List => Command::List,
        Action::Add { key, info } => Command::Add { key, info },
        Action::Remove { key, .. } => Command::Remove { key },
        Action::Claim { key } => Command::Claim { key },
        Action::Name { key, name } => Command::SetName { key, name },
        Action::Contains { key } => Command::Contains { key },
        Action::Merge { path } => Command::Merge {
            ownership: OwnershipMap::load(&path)?,
        },
    };

    // The CLI exits right after the command, so wait for the remote sync
    let (output, notice) = execute(&registry, command).settle().await;

    match output {
        CommandOutput::Rows(rows) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!(
                        "{}\t{}\t{}\t{}",
                        row.public_key,
                        row.label,
                        row.category,
                        if row.owned { "owned" } else { "" }
                    );
                }
            }
        }
        CommandOutput::Contains(found) => println!("{}", found),
        CommandOutput::Merged(count) => println!("{} devices added", count),
        CommandOutput::Outcome(MutationOutcome::Unchanged) => println!("unchanged"),
        CommandOutput::Outcome(MutationOutcome::Declined) => println!("cancelled"),
        CommandOutput::Outcome(MutationOutcome::Applied { .. }) => match notice {
            Some(notice) if !notice.success => println!("saved locally, sync failed"),
            _ => println!("ok"),
        },
    }

    Ok(())
}
