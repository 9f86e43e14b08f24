use crate::structs::{ConnectRequest, ConnectResponse, DeviceStatus, DisconnectResponse, ScanResponse};
use async_trait::async_trait;

// 在这里定义控制器依赖的外部能力：设备 API 与用户确认提示。

/// The clock's JSON API as the controller relies on it.
///
/// Every call has exactly one success branch and one failure branch. A
/// transport or parse failure is an `Err`; a failure the device reports in
/// its payload (e.g. `status: "failed"`) is an `Ok` the caller inspects.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// GET /api/scan
    async fn scan(&self) -> crate::Result<ScanResponse>;

    /// GET /api/status
    async fn status(&self) -> crate::Result<DeviceStatus>;

    /// POST /api/connect
    async fn connect(&self, request: &ConnectRequest) -> crate::Result<ConnectResponse>;

    /// POST /api/disconnect
    async fn disconnect(&self) -> crate::Result<DisconnectResponse>;
}

/// 阻塞式的用户确认（浏览器中的 alert）。
///
/// The controller awaits it, so an implementation may wait for the user to
/// acknowledge before returning.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, message: &str);
}
