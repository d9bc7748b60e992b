use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dbxq::config::Config;
use dbxq::databricks::DatabricksProvider;
use dbxq::health::check_health;
use dbxq::query::{query_data, QueryDataRequest};
use dbxq::resource::registered_kinds;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Query Databricks job runs and pipelines as tabular frames
#[derive(Parser, Debug)]
#[command(name = "dbxq", version, about, long_about = None)]
struct Args {
    /// Workspace URL (overrides DATABRICKS_HOST and the config file)
    #[arg(short, long, global = true)]
    workspace: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a batch of queries read as JSON from a file or stdin
    Query {
        /// Batch file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Deadline for the whole batch, in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Check settings and credentials against the workspace
    Check,
    /// List the queryable resource kinds
    Kinds,
    /// Save non-secret settings to the config file (with --workspace)
    Configure {
        #[arg(long)]
        client_id: Option<String>,

        #[arg(long)]
        default_limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG refines the filter, --log-level caps it
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("dbxq started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("dbxq").join("dbxq.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".dbxq").join("dbxq.log");
    }
    PathBuf::from("dbxq.log")
}

fn read_batch(file: Option<&PathBuf>) -> Result<QueryDataRequest> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    serde_json::from_str(&content).context("Invalid query batch")
}

/// Cancel `cancel` once `timeout` elapses
fn arm_deadline(cancel: &CancellationToken, timeout: Duration) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("Deadline of {:?} reached, cancelling", timeout);
                cancel.cancel();
            }
        }
    });
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();

    match args.command {
        Command::Query {
            file,
            timeout,
            compact,
        } => {
            let batch = read_batch(file.as_ref())?;
            let mut settings = config.settings(args.workspace.as_deref());
            if let Some(secs) = timeout {
                settings.timeout = Duration::from_secs(secs);
            }

            let cancel = CancellationToken::new();
            arm_deadline(&cancel, settings.timeout);

            let default_limit = settings.default_limit;
            let provider = DatabricksProvider::new(settings);
            let response = query_data(batch, default_limit, &provider, &cancel).await;
            cancel.cancel();

            print_json(&response, compact)?;
        }
        Command::Check => {
            let settings = config.settings(args.workspace.as_deref());
            let cancel = CancellationToken::new();
            arm_deadline(&cancel, settings.timeout);

            let result = check_health(&settings, &cancel).await;
            cancel.cancel();

            print_json(&result, false)?;
            if !result.is_ok() {
                drop(log_guard);
                std::process::exit(1);
            }
        }
        Command::Kinds => {
            for (kind, name) in registered_kinds() {
                println!("{:<18} {}", kind.tag(), name);
            }
        }
        Command::Configure {
            client_id,
            default_limit,
        } => {
            if let Some(workspace) = args.workspace {
                config.workspace = Some(dbxq::config::normalize_workspace_url(&workspace)?);
            }
            if client_id.is_some() {
                config.client_id = client_id;
            }
            if default_limit.is_some() {
                config.default_limit = default_limit;
            }

            let path = config.save()?;
            println!("Saved configuration to {}", path.display());
        }
    }

    Ok(())
}
