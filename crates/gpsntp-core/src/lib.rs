pub mod api;
pub mod channel;
pub mod client;
pub mod config;
pub mod endpoint;
#[cfg(test)]
mod fake_device;
pub mod poller;
pub mod reconciler;
pub mod snapshot;

pub use api::{DeviceApi, FetchError, HttpDeviceApi};
pub use channel::{ChannelError, LiveChannel, PushConnection, PushConnector, TransportEvent, WsConnector};
pub use client::{ClientError, DashboardClient};
pub use config::ClientConfig;
pub use endpoint::{Endpoint, EndpointError};
pub use poller::{PollerHandle, ResourcePoller};
pub use reconciler::{reconcile, Reconciler, UpdateSink};
pub use snapshot::{
    ConnectionState, GpsSnapshot, LiveTimeSample, NtpSnapshot, StatusSnapshot, Update, ViewState,
};
