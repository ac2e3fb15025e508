use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qos_dashboard::backend::Backend;
use qos_dashboard::config::{self, DashboardConfig};
use qos_dashboard::file_server::FileServer;
use qos_dashboard::operator_console::run_operator_console;
use qos_dashboard::view::{DashboardView, Mount};
use qos_dashboard::{ApiClient, DashboardClient};
use qos_protocol::LogTarget;

#[derive(Parser, Debug)]
#[command(name = "qos-dashboard", version, about = "QoS testbed dashboard")]
struct Cli {
    /// Config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Interactive operator console (default).
    Console {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
    /// Run the dashboard API server.
    Serve {
        #[arg(long)]
        bind: Option<String>,
        /// Directory holding the backend scripts and CSV files.
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },
    /// Start one backend script and print the response.
    Run {
        script: LogTarget,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print QoS status and generator readiness.
    Status {
        #[arg(long)]
        base_url: Option<String>,
    },
}

/// Console mode owns the terminal, so its logs go to a file.
fn init_tracing(config: &DashboardConfig, to_file: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("qos_dashboard=info"));

    if to_file {
        let dir = config::log_dir();
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("console.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn client_for(config: &DashboardConfig, base_url: Option<String>) -> anyhow::Result<ApiClient> {
    let base_url = base_url.unwrap_or_else(|| config.client.base_url.clone());
    Ok(ApiClient::new(&base_url, config.client.request_timeout())?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = config::load_or_default(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Cmd::Console {
        base_url: None,
        poll_interval_ms: None,
    });

    init_tracing(&config, matches!(command, Cmd::Console { .. }))?;

    match command {
        Cmd::Console {
            base_url,
            poll_interval_ms,
        } => {
            if let Some(ms) = poll_interval_ms {
                config.client.poll_interval_ms = ms;
            }
            let api = client_for(&config, base_url)?;
            let mount = Mount::all().with_panels(&config.client.panels);
            let client = DashboardClient::new(api, DashboardView::shared(&mount));
            tracing::info!(
                base_url = client.api().base_url(),
                poll_interval_ms = config.client.poll_interval_ms,
                "Operator console starting"
            );
            run_operator_console(client, config.client.poll_interval()).await?;
        }
        Cmd::Serve { bind, base_dir } => {
            config.server.apply_port_env();
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            if let Some(base_dir) = base_dir {
                config.server.base_dir = base_dir;
            }
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                base_dir = %config.server.base_dir.display(),
                interpreter = %config.server.interpreter,
                "QoS dashboard server starting"
            );
            let bind_addr = config.server.bind_addr.clone();
            let backend = Backend::new(config.server);
            FileServer::new(bind_addr, backend).run().await?;
        }
        Cmd::Run { script, base_url } => {
            let api = client_for(&config, base_url)?;
            let response = api.run_script(script).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Cmd::Status { base_url } => {
            let api = client_for(&config, base_url)?;
            let status = api.fetch_qos_status().await?;
            let flags = api.fetch_state_flags().await?;
            println!("QoS:      {}", status.badge_text());
            println!("Video:    {}", if flags.video_ready { "ready" } else { "not ready" });
            println!("Download: {}", if flags.download_ready { "ready" } else { "not ready" });
        }
    }

    Ok(())
}
