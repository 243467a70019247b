use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mongowatch::supervisor::{guarded, supervise, FATAL_EXIT_CODE};
use mongowatch::{Output, Poller, Settings, StatusFetcher};

#[derive(Parser, Debug)]
#[command(name = "mongowatch")]
#[command(about = "Polls the MongoDB HTTP status interface and prints metric lines")]
struct Args {
    /// Path to a configuration file (JSON, TOML or YAML); missing is fine
    #[arg(short, long, default_value = "param.json")]
    config: PathBuf,

    /// MongoDB host (default: 127.0.0.1)
    #[arg(long)]
    hostname: Option<String>,

    /// MongoDB port; the status interface is expected 1000 above it
    #[arg(short, long)]
    port: Option<u16>,

    /// Poll interval in milliseconds (default: 1000)
    #[arg(short = 'i', long)]
    poll_interval: Option<u64>,

    /// Source label attached to every metric (default: this machine's hostname)
    #[arg(short, long)]
    source: Option<String>,

    /// Username for HTTP basic auth
    #[arg(short, long)]
    username: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long)]
    password: Option<String>,

    /// Request timeout in milliseconds (default: 10000)
    #[arg(long)]
    timeout: Option<u64>,

    /// Prefix for metric names (default: MONGO_)
    #[arg(long)]
    prefix: Option<String>,
}

impl Args {
    fn overrides(&self) -> Settings {
        Settings {
            hostname: self.hostname.clone(),
            port: self.port,
            poll_interval: self.poll_interval,
            source: self.source.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout_ms: self.timeout,
            prefix: self.prefix.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();

    // stdout carries the metric stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mongowatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Log panics with a backtrace before they are turned into an exit code
    std::panic::set_hook(Box::new(|panic| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        error!("panic: {}\n{}", panic, backtrace);
    }));

    if let Err(err) = guarded(|| run(&args)) {
        error!("fatal: {:#}\n{:?}", err, err);
        std::process::exit(FATAL_EXIT_CODE);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Settings::load(&args.config, args.overrides())?.resolve()?;
    info!(
        url = %config.status_url(),
        source = %config.source,
        auth = config.credentials.is_some(),
        "mongowatch starting"
    );

    let fetcher = StatusFetcher::from_config(&config)?;
    let poller = Poller::builder(fetcher)
        .output(Output::stdout(config.prefix.clone()))
        .interval(config.poll_interval)
        .label(config.source.clone())
        .build();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(supervise(poller))
}
