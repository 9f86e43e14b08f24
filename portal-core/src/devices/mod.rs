pub mod http;

#[cfg(any(test, feature = "device_mock"))]
pub mod mock;

pub use http::HttpDevice;

#[cfg(any(test, feature = "device_mock"))]
pub use mock::MockDevice;
