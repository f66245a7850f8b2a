use anyhow::{bail, Context};
use bowlwatch::collectors::HttpSampleSource;
use bowlwatch::config::Config;
use bowlwatch::error::ConfigError;
use bowlwatch::notifiers::{LogNotifier, Notifier, SlackNotifier};
use bowlwatch::{BowlMonitor, CycleOutcome};
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Timeout for a single webhook post
const NOTIFIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Command-line arguments for the bowl monitor
#[derive(Parser)]
#[command(
    name = "bowlwatch",
    about = "Water bowl monitor - low water alerts from a distance sensor",
    long_about = "Polls an HTTP distance sensor mounted above a water bowl, averages the last \
                  few readings, and posts a Slack alert when the water runs low. Alerts are \
                  suppressed while the bowl is off its stand and repeated at most once per \
                  cooldown."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging output (debug level)")]
    verbose: bool,

    /// Log alerts instead of posting them
    #[arg(long, help = "Log alerts instead of sending them to Slack")]
    dry_run: bool,

    /// Run a single cycle and exit
    #[arg(long, help = "Poll the sensor once, report, and exit")]
    once: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// Load configuration from file or use defaults
///
/// A missing or invalid file is reported and replaced by the defaults.
fn load_config(config_path: Option<&Path>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(reason)) => {
                    warn!(
                        "Configuration file not found or unreadable ({}), using defaults",
                        reason
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

/// Pick the alert channel: Slack when configured, the log otherwise
fn build_notifier(config: &Config, dry_run: bool) -> Arc<dyn Notifier> {
    if dry_run {
        info!("Dry run: alerts will only be logged");
        return Arc::new(LogNotifier::new());
    }

    match SlackNotifier::new(config.slack.webhook_url.clone(), NOTIFIER_TIMEOUT) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            warn!("{}; alerts will only be logged", e);
            Arc::new(LogNotifier::new())
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Starting bowlwatch");

    if let Err(e) = cli.validate() {
        bail!("Invalid arguments: {}", e);
    }

    let config = load_config(cli.config.as_deref());

    let source = HttpSampleSource::new(config.sensor.url.clone(), config.sensor_timeout())
        .context("Failed to create sensor client")?;
    info!("Reading sensor at {}", source.url());

    let notifier = build_notifier(&config, cli.dry_run);
    let mut monitor = BowlMonitor::new(&config, Box::new(source), notifier);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    if cli.once {
        runtime.block_on(async {
            match monitor.run_cycle().await {
                CycleOutcome::Skipped(e) => error!("Cycle failed: {}", e),
                outcome => info!("Cycle outcome: {:?}", outcome),
            }
            monitor.flush_deliveries().await;
        });
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("Received interrupt signal (SIGINT), shutting down gracefully...");
        if shutdown_tx.send(true).is_err() {
            error!("Failed to send shutdown signal");
        }
    })
    .context("Error setting SIGINT handler for graceful shutdown")?;

    info!("bowlwatch is running. Press Ctrl+C to stop.");
    runtime.block_on(monitor.run(shutdown_rx));

    info!("bowlwatch shutdown complete");
    Ok(())
}
