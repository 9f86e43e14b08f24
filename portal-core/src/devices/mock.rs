use crate::Result;
use crate::structs::{
    ConnectRequest, ConnectResponse, DeviceMode, DeviceStatus, DisconnectResponse, NetworkEntry,
    ScanResponse, Security,
};
use crate::traits::DeviceApi;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

const AP_IP: &str = "192.168.4.1";
const STATION_IP: &str = "192.168.1.50";

/// A mock clock for development without hardware.
/// It simulates scanning, joining and leaving networks, and reports the host
/// clock as the NTP time while "connected".
#[derive(Debug, Default)]
pub struct MockDevice {
    joined: Mutex<Option<String>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn networks() -> Vec<NetworkEntry> {
        let entry = |ssid: &str, security, signal| NetworkEntry {
            ssid: ssid.to_string(),
            security,
            signal,
        };
        vec![
            entry("MyHomeWiFi", Security::Secured, 95),
            entry("CafeGuest", Security::Open, 78),
            entry("Neighbor's Network", Security::Secured, 55),
            entry("xfinitywifi", Security::Secured, 88),
            entry("HiddenNetwork", Security::Secured, 42),
        ]
    }
}

#[async_trait]
impl DeviceApi for MockDevice {
    async fn scan(&self) -> Result<ScanResponse> {
        println!("🤖 [MockDevice] Scanning for networks...");
        sleep(Duration::from_secs(2)).await;

        let networks = Self::networks();
        println!("🤖 [MockDevice] Found {} networks.", networks.len());
        Ok(ScanResponse { networks })
    }

    async fn status(&self) -> Result<DeviceStatus> {
        let joined = self.joined.lock().await.clone();
        let status = match joined {
            Some(ssid) => DeviceStatus {
                mode: DeviceMode::Station,
                connected: true,
                ssid: Some(ssid),
                ip: Some(STATION_IP.to_string()),
                time: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            },
            None => DeviceStatus {
                mode: DeviceMode::AccessPoint,
                connected: false,
                ssid: None,
                ip: Some(AP_IP.to_string()),
                time: None,
            },
        };
        Ok(status)
    }

    async fn connect(&self, request: &ConnectRequest) -> Result<ConnectResponse> {
        println!(
            "🤖 [MockDevice] Attempting to connect to SSID: '{}' with password: '{}'",
            request.ssid,
            if request.password.is_some() { "********" } else { "(none)" }
        );
        sleep(Duration::from_secs(3)).await;

        let failed = |message: &str| ConnectResponse {
            status: "failed".to_string(),
            ip: None,
            message: Some(message.to_string()),
        };

        let Some(network) = Self::networks().into_iter().find(|n| n.ssid == request.ssid) else {
            return Ok(failed("Network not found"));
        };
        // Simulate a failure for a specific network for testing purposes
        if network.ssid == "xfinitywifi" {
            println!("🤖 [MockDevice] Connection failed to '{}'", network.ssid);
            return Ok(failed("Connection timeout"));
        }
        if network.requires_credential() && request.password.is_none() {
            return Ok(failed("Password required"));
        }

        println!("🤖 [MockDevice] Connection successful to '{}'", network.ssid);
        *self.joined.lock().await = Some(network.ssid);
        Ok(ConnectResponse {
            status: "connected".to_string(),
            ip: Some(STATION_IP.to_string()),
            message: None,
        })
    }

    async fn disconnect(&self) -> Result<DisconnectResponse> {
        println!("🤖 [MockDevice] Leaving network and restarting access point (simulated).");
        *self.joined.lock().await = None;
        Ok(DisconnectResponse {
            status: "disconnected".to_string(),
            ap_ip: Some(AP_IP.to_string()),
        })
    }
}
