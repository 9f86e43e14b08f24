//! The page model the controller renders into.
//!
//! Every element of the configuration page is plain data here, so a
//! front-end only has to draw a `PortalState` and forward user input.

use crate::structs::NetworkEntry;

/// 两个互斥的视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// 配网视图：扫描、选择网络、输入密码
    #[default]
    AccessPoint,
    /// 已连接视图：显示 SSID、IP 和时间
    Station,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

/// 密码输入框
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPrompt {
    pub ssid: String,
    pub password: String,
    /// Inline validation text from the last rejected submit.
    pub validation: Option<String>,
}

/// Station 视图中显示的信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationInfo {
    pub ssid: String,
    pub ip: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalState {
    pub view: View,
    /// Current scan result, sorted by descending signal.
    pub networks: Vec<NetworkEntry>,
    /// SSID of an entry in `networks`.
    pub selected: Option<String>,
    pub requires_credential: bool,
    pub connect_enabled: bool,
    pub scan_enabled: bool,
    /// Busy indicator shown while a scan is in flight.
    pub scanning: bool,
    pub status: Option<StatusMessage>,
    pub prompt: Option<CredentialPrompt>,
    pub station: StationInfo,
    pub polling: bool,
}

impl Default for PortalState {
    fn default() -> Self {
        Self {
            view: View::AccessPoint,
            networks: Vec::new(),
            selected: None,
            requires_credential: false,
            connect_enabled: false,
            scan_enabled: true,
            scanning: false,
            status: None,
            prompt: None,
            station: StationInfo::default(),
            polling: false,
        }
    }
}

impl PortalState {
    pub fn show_message(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    pub fn clear_message(&mut self) {
        self.status = None;
    }

    /// Replaces the list wholesale; the previous selection is dropped.
    pub fn replace_networks(&mut self, mut networks: Vec<NetworkEntry>) {
        // sort_by is stable: equal signals keep response order
        networks.sort_by(|a, b| b.signal.cmp(&a.signal));
        self.networks = networks;
        self.clear_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.requires_credential = false;
    }

    pub fn selected_network(&self) -> Option<&NetworkEntry> {
        let ssid = self.selected.as_deref()?;
        self.networks.iter().find(|n| n.ssid == ssid)
    }
}
