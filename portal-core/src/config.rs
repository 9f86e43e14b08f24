use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// 编译进二进制的默认配置
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/portal.toml");

/// 覆盖设备地址的环境变量
pub const DEVICE_URL_ENV: &str = "PORTAL_DEVICE_URL";

/// 门户运行时配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// 设备 HTTP API 的基础地址，例如 `http://192.168.4.1`
    pub device_url: String,
    /// 设备配网热点的 SSID
    pub ap_ssid: String,
}

/// 用于解析 TOML 的临时结构，所有字段都可以省略
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PortalConfigFile {
    device_url: Option<String>,
    ap_ssid: Option<String>,
}

impl PortalConfig {
    /// Built-in defaults.
    pub fn defaults() -> Result<Self> {
        let parsed: PortalConfigFile = toml::from_str(DEFAULT_CONFIG_TOML)?;
        match (parsed.device_url, parsed.ap_ssid) {
            (Some(device_url), Some(ap_ssid)) => Ok(Self {
                device_url,
                ap_ssid,
            }),
            _ => Err(Error::Config(
                "embedded defaults must set device_url and ap_ssid".to_string(),
            )),
        }
    }

    /// Defaults overlaid with the fields present in `s`.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let parsed: PortalConfigFile = toml::from_str(s)?;
        let mut config = Self::defaults()?;
        if let Some(url) = parsed.device_url {
            config.device_url = url;
        }
        if let Some(ssid) = parsed.ap_ssid {
            config.ap_ssid = ssid;
        }
        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载；未指定文件时使用默认配置
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                let s = tokio::fs::read_to_string(path).await?;
                Self::from_toml_str(&s)?
            }
            None => Self::defaults()?,
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `PORTAL_DEVICE_URL` through the given lookup.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(DEVICE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            tracing::debug!("{} overrides device_url: {}", DEVICE_URL_ENV, url);
            self.device_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.device_url.starts_with("http://") || self.device_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "device_url must be an http(s) URL, got '{}'",
                self.device_url
            )));
        }
        if self.ap_ssid.trim().is_empty() {
            return Err(Error::Config("ap_ssid must not be empty".to_string()));
        }
        Ok(())
    }
}
