//! pipeline-analyzer CLI - serve the analysis API or check a pipeline file

use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use pipeline_analyzer::api::AppState;
use pipeline_analyzer::config::AppConfig;
use pipeline_analyzer::gateway::{AnalysisGateway, HttpAnalyzer, Resolution};
use pipeline_analyzer::store::MemoryStore;
use pipeline_analyzer::{parse, server, validate};

#[derive(Parser)]
#[command(name = "pipeline-analyzer")]
#[command(about = "Validate node/edge pipelines and check that they form a DAG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on
        #[arg(short, long, env = "PIPELINE_LISTEN")]
        listen: Option<SocketAddr>,

        /// Remote analyzer to try before analyzing locally
        #[arg(long, env = "PIPELINE_REMOTE_URL")]
        remote_url: Option<String>,

        /// Bounded wait for the remote analyzer, in milliseconds
        #[arg(long, env = "PIPELINE_REMOTE_TIMEOUT_MS")]
        remote_timeout_ms: Option<u64>,
    },

    /// Analyze a pipeline JSON file ("-" reads stdin)
    Analyze {
        file: PathBuf,

        /// Also print structural diagnostics to stderr
        #[arg(long)]
        explain: bool,

        /// Remote analyzer to try before analyzing locally
        #[arg(long, env = "PIPELINE_REMOTE_URL")]
        remote_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            listen,
            remote_url,
            remote_timeout_ms,
        } => run_server(config.as_deref(), listen, remote_url, remote_timeout_ms).await,
        Commands::Analyze {
            file,
            explain,
            remote_url,
        } => analyze_file(&file, explain, remote_url).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn build_gateway(url: Option<&str>, timeout: std::time::Duration) -> anyhow::Result<AnalysisGateway> {
    let Some(url) = url else {
        return Ok(AnalysisGateway::local());
    };
    let remote = HttpAnalyzer::new(url, timeout).context("failed to build remote analyzer")?;
    Ok(AnalysisGateway::with_remote(Arc::new(remote), timeout))
}

async fn run_server(
    config: Option<&Path>,
    listen: Option<SocketAddr>,
    remote_url: Option<String>,
    remote_timeout_ms: Option<u64>,
) -> anyhow::Result<i32> {
    let config = AppConfig::load(config)?.with_overrides(listen, remote_url, remote_timeout_ms);

    let gateway = match &config.remote {
        Some(remote) => build_gateway(Some(&remote.url), remote.timeout())?,
        None => AnalysisGateway::local(),
    };
    let state = AppState::new(gateway, Arc::new(MemoryStore::new()));

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    server::serve(listener, state, config.limits(), shutdown).await?;
    Ok(0)
}

async fn analyze_file(file: &Path, explain: bool, remote_url: Option<String>) -> anyhow::Result<i32> {
    let json = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?
    };

    let value = match parse::parse_json(&json) {
        Ok(value) => value,
        Err(errors) => return Ok(report_invalid(&errors)),
    };

    let timeout = pipeline_analyzer::gateway::DEFAULT_REMOTE_TIMEOUT;
    let gateway = build_gateway(remote_url.as_deref(), timeout)?;
    let resolution = gateway.resolve(&value).await;
    if let Resolution::FellBack { reason, .. } = &resolution {
        eprintln!("Remote analyzer unavailable ({}), analyzed locally", reason);
    }

    match resolution.into_outcome() {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            if explain {
                if let Ok(payload) = parse::schema::validate_payload(&value) {
                    for diagnostic in validate::diagnose(&payload) {
                        eprintln!("  {}", diagnostic);
                    }
                }
            }
            Ok(0)
        }
        Err(errors) => Ok(report_invalid(&errors)),
    }
}

fn report_invalid(errors: &[pipeline_analyzer::error::PipelineError]) -> i32 {
    eprintln!("Invalid pipeline data:");
    for e in errors {
        eprintln!("  {}", e);
    }
    1
}
