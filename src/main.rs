// Render a JavaScript-driven page in headless Chromium and write an offline
// snapshot: rendered HTML, extracted data-URI assets, and the page's CSS.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kodegen_tools_rendersnap::utils::{DEFAULT_OUTPUT_DIR, DEFAULT_ROOT_SELECTOR, load_env_file};
use kodegen_tools_rendersnap::{CaptureConfig, run_capture};

#[derive(Debug, Parser)]
#[command(name = "kodegen-rendersnap", version, about)]
struct Cli {
    /// Page to capture; falls back to TARGET_URL in the env file
    #[arg(long, env = "TARGET_URL")]
    url: Option<String>,

    #[arg(long, env = "RENDERSNAP_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// `KEY=VALUE` file consulted for TARGET_URL
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Quiet period in milliseconds before the network counts as idle
    #[arg(long)]
    idle_ms: Option<u64>,

    /// Ceiling in seconds on the network-idle wait
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Deadline in seconds for the whole run
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Element the client-side app mounts into
    #[arg(long, default_value = DEFAULT_ROOT_SELECTOR)]
    root_selector: String,

    /// Selector that must match at least one visible element (repeatable)
    #[arg(long = "require")]
    required: Vec<String>,

    #[arg(long)]
    user_agent: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Print the capture report as JSON on stdout
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: Cli) -> Result<CaptureConfig> {
    let url = match cli.url {
        Some(url) => url,
        None => load_env_file(&cli.env_file)
            .remove("TARGET_URL")
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "TARGET_URL not set (use --url, the environment, or {})",
                    cli.env_file.display()
                )
            })?,
    };

    let mut builder = CaptureConfig::builder()
        .target_url(url)
        .output_dir(cli.output_dir)
        .root_selector(cli.root_selector)
        .required_selectors(cli.required)
        .headless(!cli.headful);

    if let Some(ms) = cli.idle_ms {
        builder = builder.idle_window_ms(ms);
    }
    if let Some(secs) = cli.idle_timeout_secs {
        builder = builder.idle_hard_timeout_secs(secs);
    }
    if let Some(secs) = cli.timeout_secs {
        builder = builder.overall_deadline_secs(secs);
    }
    if let Some(user_agent) = cli.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder.build().context("Invalid capture configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let json = cli.json;
    let config = build_config(cli)?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling capture");
            ctrl_c_token.cancel();
        }
    });

    info!(
        "Capturing {} into {}",
        config.target_url(),
        config.output_dir().display()
    );

    match run_capture(&config, &cancel).await {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Saved {} ({} assets, {} stylesheets, {} inline, {} dynamic)",
                    report.snapshot.html_path.display(),
                    report.snapshot.assets_saved,
                    report.stylesheets.len(),
                    report.inline_styles.len(),
                    report.dynamic_styles.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            if e.is_idle_timeout() {
                error!("{e}; retry with a longer --idle-timeout-secs");
            } else {
                error!("Capture failed: {e}");
            }
            Err(e.into())
        }
    }
}
