//! Tailor - resolves security-control profiles into tailored catalogs

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use tailor_core::{Engine, EngineConfig};

mod output;

use output::Format;

/// Modules that can be traced individually
#[derive(Debug, Clone, ValueEnum)]
enum TraceModule {
    Resolve,
    Fetch,
    Merge,
    All,
}

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "tailor",
    about = "Resolve security-control profiles into tailored catalogs",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Enable structured tracing (comma-separated: resolve,fetch,merge,all)
    #[clap(long, value_delimiter = ',', global = true)]
    trace: Vec<TraceModule>,

    /// Set the log level
    #[clap(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Configuration file (defaults to ./tailor.yml, then the user config dir)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Resolve a profile into one tailored catalog per import
    Resolve {
        /// Path to the profile document (JSON or YAML)
        profile: PathBuf,

        /// Write the catalogs to this file instead of stdout
        #[clap(long, short)]
        out: Option<PathBuf>,

        #[clap(long, value_enum, default_value = "json")]
        format: Format,

        /// Skip failing imports instead of aborting
        #[clap(long)]
        keep_going: bool,
    },

    /// List the alterations that apply to a profile's selectors
    Alterations {
        profile: PathBuf,

        #[clap(long, value_enum, default_value = "json")]
        format: Format,
    },
}

fn initialize_tracing(log_level: &LogLevel, trace_modules: &[TraceModule]) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());

    for module in trace_modules {
        let directive = match module {
            TraceModule::Resolve => "tailor_core::resolve=trace",
            TraceModule::Fetch => "tailor_core::fetch=trace",
            TraceModule::Merge => "tailor_core::merge=trace",
            TraceModule::All => "tailor_core=trace",
        };

        if let Ok(parsed) = directive.parse() {
            filter = filter.add_directive(parsed);
        }
    }

    // Logs go to stderr; stdout carries the resolved documents
    if !trace_modules.is_empty() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();

        tracing::info!(trace_modules = ?trace_modules, "Tailor tracing enabled");
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level, &cli.trace);

    let mut config =
        EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Resolve {
            profile,
            out,
            format,
            keep_going,
        } => {
            if keep_going {
                config.fail_fast = false;
            }
            let engine = Engine::new(config).context("Failed to initialize engine")?;
            let loaded = engine
                .load_profile(&profile)
                .await
                .with_context(|| format!("Failed to load profile {}", profile.display()))?;
            debug!("Profile {} has {} imports", profile.display(), loaded.imports.len());

            let catalogs = engine.resolve(&loaded).await.map_err(|e| {
                error!("Resolution failed: {}", e);
                e
            })?;
            info!("Resolved {} catalogs", catalogs.len());

            output::emit(&catalogs, format, out.as_deref())
        }
        Command::Alterations { profile, format } => {
            let engine = Engine::new(config).context("Failed to initialize engine")?;
            let loaded = engine
                .load_profile(&profile)
                .await
                .with_context(|| format!("Failed to load profile {}", profile.display()))?;
            let alterations = engine.alterations(&loaded).await?;
            output::emit(&alterations, format, None)
        }
    }
}
