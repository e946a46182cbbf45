use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use pingwatch::config::{require_duration, LoggingConfig, MonitorConfig};
use pingwatch::monitor::Monitor;
use pingwatch::notify::Notifier;
use pingwatch::probe::NetworkProber;
use pingwatch::registry::Registry;
use pingwatch::server::QueryServer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "pingwatch", version = pingwatch::VERSION, about = "Minimal availability monitor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe configured targets on a schedule and post verdicts to webhooks
    Monitor {
        /// Configuration file
        #[arg(short = 'c', long = "config")]
        config: PathBuf,
        /// Delay between cycles (e.g. 30s, 10m, 1h)
        #[arg(long, default_value = "10m")]
        interval: String,
        /// Run a single cycle, wait for it and exit
        #[arg(long)]
        once: bool,
    },
    /// Answer status queries over HTTP
    Serve {
        /// Listening port
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
        /// Listening address
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
    },
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    pingwatch::logging::init(&logging);

    info!("Starting pingwatch {}", pingwatch::VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli.command))
}

async fn async_main(command: Command) -> Result<(), BoxError> {
    match command {
        Command::Monitor {
            config,
            interval,
            once,
        } => run_monitor(config, &interval, once).await,
        Command::Serve { port, bind } => run_server(SocketAddr::new(bind, port)).await,
    }
}

async fn run_monitor(path: PathBuf, interval: &str, once: bool) -> Result<(), BoxError> {
    let config = MonitorConfig::load(&path)?;
    config.log_summary();
    if config.targets.is_empty() {
        warn!("No targets configured in {}", path.display());
    }

    let interval = require_duration("--interval", interval)?;
    let monitor = Monitor::new(
        Registry::from_config(&config),
        NetworkProber::for_push()?,
        Notifier::new()?,
    )
    .with_interval(interval);

    if once {
        for handle in monitor.run_cycle() {
            if let Err(e) = handle.await {
                error!("Probe task failed: {}", e);
            }
        }
        return Ok(());
    }

    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}

async fn run_server(addr: SocketAddr) -> Result<(), BoxError> {
    let server = QueryServer::new(addr, NetworkProber::for_query()?);

    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
