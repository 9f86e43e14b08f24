//! The portal controller: network selection, connect/disconnect requests and
//! the station-mode status poller.
//!
//! All page state lives in a `watch` channel owned by the controller. Each
//! operation publishes its "disable" side effects before the device request is
//! issued and re-enables only in the completion branch, so a repeated trigger
//! while a request is in flight is ignored just like a click on a disabled
//! button.

use crate::page::{CredentialPrompt, MessageKind, PortalState, StationInfo, View};
use crate::structs::{ConnectRequest, DeviceStatus};
use crate::traits::{DeviceApi, Notifier};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};

/// 已连接状态下刷新时间的间隔
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// 启动后自动扫描前的等待时间
pub const INITIAL_SCAN_DELAY: Duration = Duration::from_millis(500);

pub const PASSWORD_REQUIRED: &str = "Please enter a password";

const RECONNECT_INFO: &str = "You've been disconnected from the Pi Pico W access point. \
To access the device on your network, please visit: http://{IP_ADDRESS}";

const SWITCHING_NETWORKS_INFO: &str = "The device is switching networks. \
Please reconnect to your normal Wi-Fi network and find the device at its new IP address.";

/// 轮询任务句柄；generation 用于识别被新任务取代的旧任务
#[derive(Default)]
struct Poller {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    device: Arc<dyn DeviceApi>,
    notifier: Arc<dyn Notifier>,
    ap_ssid: String,
    page: watch::Sender<PortalState>,
    poller: Mutex<Poller>,
}

/// Drives the configuration page against a device.
///
/// Cloning is cheap; all clones share the same page and poller.
#[derive(Clone)]
pub struct PortalController {
    inner: Arc<Inner>,
}

impl PortalController {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        notifier: Arc<dyn Notifier>,
        ap_ssid: impl Into<String>,
    ) -> Self {
        let (page, _) = watch::channel(PortalState::default());
        Self {
            inner: Arc::new(Inner {
                device,
                notifier,
                ap_ssid: ap_ssid.into(),
                page,
                poller: Mutex::new(Poller::default()),
            }),
        }
    }

    /// Receives every published page change.
    pub fn subscribe(&self) -> watch::Receiver<PortalState> {
        self.inner.page.subscribe()
    }

    pub fn snapshot(&self) -> PortalState {
        self.inner.page.borrow().clone()
    }

    pub fn view(&self) -> View {
        self.inner.page.borrow().view
    }

    fn update(&self, f: impl FnOnce(&mut PortalState)) {
        self.inner.page.send_modify(f);
    }

    fn poller(&self) -> MutexGuard<'_, Poller> {
        self.inner.poller.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queries the device once and, if the page is still in access point view
    /// after a short delay, starts the first scan.
    pub async fn initialize(&self) {
        tracing::debug!("Initializing portal");
        tokio::join!(self.get_status(), async {
            sleep(INITIAL_SCAN_DELAY).await;
            if self.view() == View::AccessPoint {
                self.scan().await;
            }
        });
    }

    /// Resets the page as a fresh load would, then initializes again.
    pub async fn reload(&self) {
        self.stop_polling();
        self.inner.page.send_replace(PortalState::default());
        self.initialize().await;
    }

    pub async fn scan(&self) {
        if self.view() != View::AccessPoint {
            tracing::debug!("Scan is only available in access point view");
            return;
        }
        let started = self.inner.page.send_if_modified(|p| {
            if p.view != View::AccessPoint || !p.scan_enabled {
                return false;
            }
            p.networks.clear();
            p.clear_selection();
            p.connect_enabled = false;
            p.scanning = true;
            p.scan_enabled = false;
            p.show_message("Scanning for networks...", MessageKind::Info);
            true
        });
        if !started {
            tracing::debug!("Scan already in progress, ignoring");
            return;
        }

        match self.inner.device.scan().await {
            Ok(response) => {
                tracing::info!("Scan complete, found {} networks", response.networks.len());
                self.update(|p| {
                    p.replace_networks(response.networks);
                    p.scanning = false;
                    p.scan_enabled = true;
                    if p.networks.is_empty() {
                        p.show_message("No networks found. Try scanning again.", MessageKind::Error);
                    } else {
                        p.clear_message();
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Network scan failed: {}", e);
                self.update(|p| {
                    p.show_message("Network scan failed. Please try again.", MessageKind::Error);
                    p.scanning = false;
                    p.scan_enabled = true;
                });
            }
        }
    }

    pub fn select_network(&self, ssid: &str) {
        if self.view() != View::AccessPoint {
            tracing::debug!("Network selection is only available in access point view");
            return;
        }
        self.update(|p| {
            let requires_credential = p
                .networks
                .iter()
                .find(|n| n.ssid == ssid)
                .map(|n| n.requires_credential());
            match requires_credential {
                Some(requires_credential) => {
                    p.selected = Some(ssid.to_string());
                    p.requires_credential = requires_credential;
                    p.connect_enabled = true;
                }
                None => {
                    tracing::debug!("'{}' is not in the current scan result", ssid);
                    p.clear_selection();
                    p.connect_enabled = false;
                }
            }
        });
    }

    /// Opens the credential prompt for secured networks, connects directly
    /// otherwise.
    pub async fn request_connect(&self) {
        let target = {
            let page = self.inner.page.borrow();
            if page.view != View::AccessPoint {
                tracing::debug!("Connect is only available in access point view");
                None
            } else if !page.connect_enabled {
                None
            } else {
                page.selected_network().map(|n| (n.ssid.clone(), page.requires_credential))
            }
        };
        let Some((ssid, requires_credential)) = target else {
            return;
        };

        if requires_credential {
            self.update(|p| {
                p.prompt = Some(CredentialPrompt {
                    ssid,
                    password: String::new(),
                    validation: None,
                })
            });
        } else {
            self.connect(&ssid, None).await;
        }
    }

    /// Surrounding whitespace is not part of the password.
    pub async fn submit_credential(&self, password: &str) {
        let ssid = {
            let page = self.inner.page.borrow();
            if page.prompt.is_none() {
                return;
            }
            page.selected.clone()
        };

        let password = password.trim();
        if password.is_empty() {
            self.update(|p| {
                if let Some(prompt) = p.prompt.as_mut() {
                    prompt.password.clear();
                    prompt.validation = Some(PASSWORD_REQUIRED.to_string());
                }
            });
            self.inner.notifier.alert(PASSWORD_REQUIRED).await;
            return;
        }

        self.update(|p| p.prompt = None);
        match ssid {
            Some(ssid) => self.connect(&ssid, Some(password.to_string())).await,
            None => tracing::debug!("Selection vanished while the prompt was open"),
        }
    }

    pub fn dismiss_prompt(&self) {
        self.update(|p| p.prompt = None);
    }

    pub async fn connect(&self, ssid: &str, password: Option<String>) {
        self.update(|p| {
            p.show_message(format!("Connecting to {}...", ssid), MessageKind::Info);
            p.connect_enabled = false;
            p.scan_enabled = false;
        });

        let request = ConnectRequest {
            ssid: ssid.to_string(),
            password,
        };
        match self.inner.device.connect(&request).await {
            Ok(response) if response.is_connected() => {
                let ip = response.ip.as_deref().unwrap_or("<unknown>");
                tracing::info!(ssid, ip, "Device joined network");
                let info = format!(
                    "Connected to {}! {}",
                    ssid,
                    RECONNECT_INFO.replace("{IP_ADDRESS}", ip)
                );
                self.update(|p| p.show_message(info.as_str(), MessageKind::Success));
                self.inner.notifier.alert(&info).await;
            }
            Ok(response) => {
                let reason = response.message.as_deref().unwrap_or("Unknown error");
                tracing::warn!(ssid, "Device could not join network: {}", reason);
                self.update(|p| {
                    p.show_message(format!("Failed to connect: {}", reason), MessageKind::Error);
                    p.connect_enabled = true;
                    p.scan_enabled = true;
                });
            }
            Err(e) => {
                // the device drops its access point while joining
                tracing::info!("Connect request did not complete: {}", e);
                self.update(|p| p.show_message(SWITCHING_NETWORKS_INFO, MessageKind::Info));
            }
        }
    }

    pub async fn disconnect(&self) {
        if self.view() != View::Station {
            tracing::debug!("Disconnect is only available in station view");
            return;
        }
        self.update(|p| {
            p.show_message("Disconnecting and restarting in access point mode...", MessageKind::Info)
        });

        match self.inner.device.disconnect().await {
            Ok(response) if response.is_disconnected() => {
                let mut info = format!(
                    "Device is restarting in access point mode. Please connect to the '{}' Wi-Fi network",
                    self.inner.ap_ssid
                );
                match response.ap_ip {
                    Some(ip) => info.push_str(&format!(" and open http://{} to configure it.", ip)),
                    None => info.push_str(" to configure it."),
                }
                self.update(|p| p.show_message(info.as_str(), MessageKind::Info));
                self.inner.notifier.alert(&info).await;
            }
            Ok(response) => {
                tracing::warn!("Unexpected disconnect status: {}", response.status);
                self.update(|p| {
                    p.show_message(
                        format!("Unexpected response from device: {}", response.status),
                        MessageKind::Error,
                    )
                });
            }
            Err(e) => tracing::debug!("Disconnect request did not complete, device is restarting: {}", e),
        }
    }

    pub async fn get_status(&self) {
        self.update(|p| p.show_message("Checking connection status...", MessageKind::Info));

        match self.inner.device.status().await {
            Ok(status) if status.is_station_connected() => {
                self.show_station(status);
                self.start_polling();
            }
            Ok(_) => self.show_access_point(),
            Err(e) => {
                tracing::warn!("Status check failed: {}", e);
                self.show_access_point();
            }
        }
        self.update(|p| p.clear_message());
    }

    fn show_station(&self, status: DeviceStatus) {
        tracing::info!("Device is in station mode");
        self.update(|p| {
            p.view = View::Station;
            p.station = StationInfo {
                ssid: status.ssid.unwrap_or_default(),
                ip: status.ip.unwrap_or_default(),
                time: status.time.unwrap_or_default(),
            };
        });
    }

    fn show_access_point(&self) {
        self.stop_polling();
        self.update(|p| p.view = View::AccessPoint);
    }

    /// Starts the status poller, superseding any previous one.
    fn start_polling(&self) {
        self.update(|p| p.polling = true);

        let mut poller = self.poller();
        poller.generation += 1;
        let generation = poller.generation;
        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.poll_status(generation).await });
        if let Some(previous) = poller.handle.replace(handle) {
            previous.abort();
        }
    }

    fn stop_polling(&self) {
        let mut poller = self.poller();
        poller.generation += 1;
        if let Some(handle) = poller.handle.take() {
            tracing::debug!("Stopping status polling");
            handle.abort();
        }
        drop(poller);
        self.update(|p| p.polling = false);
    }

    async fn poll_status(self, generation: u64) {
        let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.inner.device.status().await {
                Ok(status) if status.is_station_connected() => {
                    if let Some(time) = status.time {
                        self.update(|p| p.station.time = time);
                    }
                }
                Ok(_) => {
                    tracing::info!("Device left station mode, stopping status polling");
                    break;
                }
                Err(e) => {
                    tracing::warn!("Status polling error: {}", e);
                    break;
                }
            }
        }

        // page update stays under the poller lock
        let mut poller = self.poller();
        if poller.generation != generation {
            return;
        }
        // own handle: dropping it detaches, the task is finishing anyway
        poller.handle = None;
        self.update(|p| {
            p.polling = false;
            p.view = View::AccessPoint;
        });
    }
}
