use serde::{Deserialize, Serialize};
use std::fmt;

/// 设备是否要求密码。只有固件返回的字符串恰好为 "Secured" 时才需要密码，
/// 其余任何值都当作开放网络。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Security {
    #[default]
    Open,
    Secured,
}

impl From<String> for Security {
    fn from(s: String) -> Self {
        if s == "Secured" {
            Security::Secured
        } else {
            Security::Open
        }
    }
}

impl From<Security> for String {
    fn from(s: Security) -> Self {
        s.to_string()
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Security::Open => f.write_str("Open"),
            Security::Secured => f.write_str("Secured"),
        }
    }
}

/// 表示扫描到的单个 Wi-Fi 网络
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    #[serde(default)]
    pub ssid: String,
    #[serde(default)]
    pub security: Security,
    #[serde(default)]
    pub signal: i32, // 信号强度（百分比）
}

impl NetworkEntry {
    pub fn requires_credential(&self) -> bool {
        self.security != Security::Open
    }
}

/// 下拉列表中显示的文本: `HomeNet (Secured, 80%)`
impl fmt::Display for NetworkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}%)", self.ssid, self.security, self.signal)
    }
}

/// GET /api/scan 的响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub networks: Vec<NetworkEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceMode {
    #[default]
    AccessPoint,
    Station,
}

/// Anything but the exact "STA" string counts as access point mode.
impl From<String> for DeviceMode {
    fn from(s: String) -> Self {
        if s == "STA" {
            DeviceMode::Station
        } else {
            DeviceMode::AccessPoint
        }
    }
}

impl From<DeviceMode> for String {
    fn from(m: DeviceMode) -> Self {
        match m {
            DeviceMode::AccessPoint => "AP".to_string(),
            DeviceMode::Station => "STA".to_string(),
        }
    }
}

/// GET /api/status 的响应体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub mode: DeviceMode,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl DeviceStatus {
    /// True only when the device joined an external network.
    pub fn is_station_connected(&self) -> bool {
        self.mode == DeviceMode::Station && self.connected
    }
}

/// /api/connect 的请求体。开放网络不发送 password 字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub ssid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// /api/connect 的响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConnectResponse {
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}

/// /api/disconnect 的响应体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisconnectResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ap_ip: Option<String>,
}

impl DisconnectResponse {
    pub fn is_disconnected(&self) -> bool {
        self.status == "disconnected"
    }
}
