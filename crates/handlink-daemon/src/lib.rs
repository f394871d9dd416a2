//! Handlink daemon library
//!
//! Controller devices, the pose publisher, the host runtime seam and the
//! driver that wires them to the hand tracking listener. The `handlink`
//! binary runs the driver against a [`host::StaticHost`]; a VR runtime
//! binding supplies its own [`host::HostRuntime`] instead.

pub mod config;
pub mod device;
pub mod driver;
pub mod host;
pub mod publisher;

pub use config::Config;
pub use device::ControllerDevice;
pub use driver::Driver;
pub use host::{DeviceIndex, HostRuntime, StaticHost};
pub use publisher::PosePublisher;
