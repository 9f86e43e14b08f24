use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod render;
mod runner;

/// Configure the Wi-Fi of an NTP clock through its setup portal.
#[derive(Debug, Parser)]
#[command(name = "clock-portal", version)]
pub struct Cli {
    /// TOML file overriding the built-in configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Device API base URL, e.g. http://192.168.4.1
    #[arg(long, global = true)]
    pub device_url: Option<String>,

    /// Use the simulated device instead of real hardware
    #[cfg(feature = "device_mock")]
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show whether the device is in access point or station mode
    Status,
    /// List nearby networks as seen by the device
    Scan,
    /// Join a network; prompts for the password of secured networks
    Connect {
        ssid: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Leave the network and restart the device in access point mode
    Disconnect,
    /// Follow the device clock while it is connected
    Watch,
    /// Interactive session (default)
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 初始化日志（这是入口点的职责）
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 2. 调用核心逻辑
    let cli = Cli::parse();
    if let Err(e) = runner::run(cli).await {
        // 3. 处理顶层错误
        tracing::error!("❌ clock-portal failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
