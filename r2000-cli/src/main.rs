use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use r2000_control::{config::load_from_path, Config, HttpDeviceControl, StreamParamsBuilder};
use r2000_datalink::{DataLink, DeviceControl, PacketType};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "R2000 data-link demo client")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(short, long, value_name = "FILE", default_value = "r2000.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let config = match load_from_path(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(error) = run(config).await {
        error!(%error, "data link exited with error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let control: Arc<dyn DeviceControl> =
        Arc::new(HttpDeviceControl::new(config.device_address, config.control_port));

    let packet_type = parse_packet_type(&config.packet_type)?;
    let mut builder = match &config.datagram_address {
        Some(address) => StreamParamsBuilder::datagram(packet_type, address.clone()),
        None => StreamParamsBuilder::stream(packet_type),
    };
    builder = builder
        .max_num_points_scan(config.samples_per_scan)
        .watchdog(config.watchdog, config.watchdog_timeout());
    let params = builder.build()?;

    let link = DataLink::build(control, config.device_address, params).await?;
    info!(alive = link.is_alive(), "data link established");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, tearing down");
        }
        () = report_scans(&link) => {}
    }

    link.close().await;
    Ok(())
}

async fn report_scans(link: &DataLink) {
    loop {
        match link.wait_for_next(None).await {
            Some(scan) => {
                info!(
                    points = scan.distances().len(),
                    alive = link.is_alive(),
                    "scan received"
                );
            }
            None => return,
        }
    }
}

fn parse_packet_type(raw: &str) -> Result<PacketType, Box<dyn std::error::Error>> {
    match raw.to_ascii_lowercase().as_str() {
        "a" => Ok(PacketType::A),
        "b" => Ok(PacketType::B),
        "c" => Ok(PacketType::C),
        other => Err(format!("unknown packet_type \"{other}\"").into()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
