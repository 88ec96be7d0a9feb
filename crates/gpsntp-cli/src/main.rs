use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gpsntp_core::config::DEFAULT_ENDPOINT;
use gpsntp_core::{ClientConfig, DashboardClient, Endpoint, HttpDeviceApi, Reconciler, ResourcePoller, ViewState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod display;
mod viewer;

#[derive(Debug, Parser)]
#[command(name = "gpsntp-dash")]
#[command(about = "Live dashboard for the GPS NTP server")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, env = "GPSNTP_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[arg(long, default_value_t = 4000)]
    poll_interval_ms: u64,

    #[arg(long, default_value_t = 3000)]
    request_timeout_ms: u64,

    #[arg(long, default_value_t = 2000)]
    reconnect_delay_ms: u64,

    #[arg(long, default_value_t = 5000)]
    connect_timeout_ms: u64,
}

#[derive(Debug, Subcommand)]
enum Command {
    Once {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Health,
    Watch {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    View,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Ndjson,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = ClientConfig {
        endpoint: cli.endpoint.clone(),
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        request_timeout: Duration::from_millis(cli.request_timeout_ms),
        reconnect_delay: Duration::from_millis(cli.reconnect_delay_ms),
        connect_timeout: Duration::from_millis(cli.connect_timeout_ms),
    };

    match cli.command {
        Command::Once { format } => {
            let api = HttpDeviceApi::new(Endpoint::parse(&config.endpoint)?, config.request_timeout)?;
            let reconciler = Reconciler::new();
            ResourcePoller::poll_once(&api, &reconciler).await;
            print_view(&reconciler.current(), api.endpoint(), format)?;
        }
        Command::Health => {
            let api = HttpDeviceApi::new(Endpoint::parse(&config.endpoint)?, config.request_timeout)?;
            let body = api.health().await?;
            println!("{} {}", api.endpoint(), body);
        }
        Command::Watch { format } => {
            let mut client = DashboardClient::start(&config)?;
            let result = stream_loop(&client, format).await;
            client.stop().await;
            result?;
        }
        Command::View => {
            let mut client = DashboardClient::start(&config)?;
            let result = viewer::run_viewer(&client).await;
            client.stop().await;
            result?;
        }
    }

    Ok(())
}

async fn stream_loop(client: &DashboardClient, format: OutputFormat) -> Result<()> {
    let mut rx = client.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                warn!("received ctrl-c, stopping");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                print_view(&view, client.endpoint(), format)?;
                info!(connection = %view.connection, epoch = ?view.displayed_epoch(), "view updated");
            }
        }
    }

    Ok(())
}

fn print_view(view: &ViewState, endpoint: &Endpoint, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(view)?);
        }
        OutputFormat::Ndjson => {
            println!("{}", serde_json::to_string(view)?);
        }
        OutputFormat::Human => {
            println!("=== GPS NTP Server ===");
            println!("Endpoint:   {endpoint}");
            println!(
                "Time:       {} ({})  source={} socket={}",
                display::clock(view),
                display::date(view),
                display::time_source(view),
                display::socket(view)
            );
            println!(
                "GPS:        {} satellites={} lat={} lon={} alt={} last_update={}",
                display::lock(view),
                display::satellites(view),
                display::latitude(view),
                display::longitude(view),
                display::altitude(view),
                display::last_gps_update(view)
            );
            println!(
                "WiFi:       {} rssi={} ip={} gateway={}",
                display::link(view),
                display::rssi(view),
                display::local_ip(view),
                display::gateway(view)
            );
            println!(
                "NTP:        {} synced={}",
                display::ntp_requests(view),
                display::synced(view)
            );
            println!(
                "System:     free={} uptime={}",
                display::free_memory(view),
                display::uptime(view)
            );
        }
    }

    Ok(())
}
