//! PinDown command line interface
//!
//! Usage:
//!   pindown init                            - Create the ledger (once per deployment)
//!   pindown submit --link L --receiver R    - Record that you sent L to R
//!   pindown list                            - Print every record
//!   pindown search <needle>                 - Records whose link contains needle
//!   pindown whoami                          - Print the selected identity

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pindown::store::SqliteBackend;
use pindown::{
    Identity, IdentityError, IdentityProvider, InitOutcome, Keypair, KeypairProvider,
    LedgerConfig, LedgerStore, LocalView, Record, RecordInput, Session, SessionConfig,
    SessionError, StaticProvider,
};

#[derive(Parser)]
#[command(name = "pindown")]
#[command(about = "Record who sent which document to whom")]
#[command(version)]
struct Cli {
    /// Ledger database path
    #[arg(long, env = "PINDOWN_DB", default_value = "pindown.db")]
    db: PathBuf,

    /// Deployment name; selects which ledger in the database to use
    #[arg(long, env = "PINDOWN_DEPLOYMENT", default_value = "pindown")]
    deployment: String,

    /// Act as this identity handle
    #[arg(long = "as", value_name = "IDENTITY", conflicts_with = "seed")]
    identity: Option<String>,

    /// Act as the keypair derived from this 32-byte hex seed
    #[arg(long, value_name = "HEX")]
    seed: Option<String>,

    /// Give up on a ledger call after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger for this deployment
    Init,

    /// Submit a record issued by the selected identity
    Submit {
        /// Document link (URL, hash or content address)
        #[arg(short, long)]
        link: String,
        /// Receiver identity
        #[arg(short, long)]
        receiver: String,
    },

    /// Print every record
    List,

    /// Print records whose document link contains NEEDLE
    Search {
        needle: String,
    },

    /// Print the selected identity
    Whoami,
}

/// The identity source picked on the command line.
enum CliIdentity {
    Handle(StaticProvider),
    Keypair(KeypairProvider),
}

impl CliIdentity {
    fn from_args(identity: Option<String>, seed: Option<String>) -> anyhow::Result<Self> {
        if let Some(seed) = seed {
            let bytes = hex::decode(seed.trim()).context("seed is not valid hex")?;
            let seed: [u8; 32] = match bytes.try_into() {
                Ok(seed) => seed,
                Err(bytes) => bail!("seed must be 32 bytes, got {}", bytes.len()),
            };
            return Ok(Self::Keypair(KeypairProvider::new(Keypair::from_seed(&seed))));
        }

        Ok(Self::Handle(match identity {
            Some(handle) if !handle.is_empty() => StaticProvider::new(handle),
            _ => StaticProvider::unavailable(),
        }))
    }
}

#[async_trait]
impl IdentityProvider for CliIdentity {
    async fn connect(&self) -> Result<Identity, IdentityError> {
        match self {
            Self::Handle(p) => p.connect().await,
            Self::Keypair(p) => p.connect().await,
        }
    }

    async fn try_silent_connect(&self) -> Option<Identity> {
        match self {
            Self::Handle(p) => p.try_silent_connect().await,
            Self::Keypair(p) => p.try_silent_connect().await,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_record(record: &Record) {
    println!(
        "{}  {} -> {}  {}",
        record.compute_id(),
        record.issuer(),
        record.receiver(),
        record.document_link()
    );
}

fn print_view(view: &LocalView) {
    match view {
        LocalView::Loaded(records) if records.is_empty() => println!("(no records)"),
        LocalView::Loaded(records) => records.iter().for_each(print_record),
        LocalView::Uninitialized => println!("ledger not initialized; run `pindown init`"),
        LocalView::Unloaded => println!("ledger not loaded"),
    }
}

/// Turn a session error into something a person can act on.
fn explain(err: SessionError) -> anyhow::Error {
    match err {
        SessionError::NoIdentity(IdentityError::Unavailable) => {
            anyhow::anyhow!("no wallet/identity available; pass --as or --seed")
        }
        e if e.is_not_initialized() => {
            anyhow::anyhow!("ledger not initialized; run `pindown init` first")
        }
        SessionError::OutcomeUnknown { possible_duplicate } => anyhow::anyhow!(
            "submit timed out and may have succeeded{}; check `pindown list` before retrying",
            if possible_duplicate {
                " (it is already visible)"
            } else {
                ""
            }
        ),
        SessionError::AppendedRefreshFailed { position, source } => anyhow::anyhow!(
            "recorded at position {}, but reloading the ledger failed ({}); do not resubmit",
            position,
            source
        ),
        e => anyhow::Error::new(e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let backend = SqliteBackend::open(&cli.db)
        .with_context(|| format!("failed to open ledger database {}", cli.db.display()))?;
    let ledger = LedgerStore::from_config(
        Arc::new(backend),
        &LedgerConfig {
            deployment: cli.deployment.clone(),
        },
    );
    tracing::debug!(address = %ledger.address(), db = %cli.db.display(), "using ledger");

    let config = SessionConfig {
        operation_timeout: cli.timeout_ms.map(Duration::from_millis),
        ..SessionConfig::default()
    };
    let provider = CliIdentity::from_args(cli.identity, cli.seed)?;
    let mut session = Session::new(ledger, provider, config);

    match cli.command {
        Commands::Init => {
            session.connect().await.map_err(explain)?;
            match session.initialize().await.map_err(explain)? {
                InitOutcome::Created => println!("ledger created"),
                InitOutcome::AlreadyInitialized => println!("ledger already initialized"),
            }
        }

        Commands::Submit { link, receiver } => {
            session.connect().await.map_err(explain)?;
            let position = session
                .submit(RecordInput::new(link, receiver))
                .await
                .map_err(explain)?;
            let total = session.view().records().map_or(0, |r| r.len());
            println!("recorded at position {} ({} records total)", position, total);
        }

        Commands::List => {
            session.refresh().await.map_err(explain)?;
            print_view(session.view());
        }

        Commands::Search { needle } => {
            session.refresh().await.map_err(explain)?;
            if session.view().is_uninitialized() {
                print_view(session.view());
                return Ok(());
            }
            let results = session.search(&needle);
            if results.is_empty() {
                println!("no matches");
            }
            results.iter().for_each(print_record);
        }

        Commands::Whoami => {
            let identity = session.connect().await.map_err(explain)?;
            println!("{}", identity);
        }
    }

    Ok(())
}
