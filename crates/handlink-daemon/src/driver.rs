//! Driver wiring: listener, hand state, and both controllers

use handlink_core::{Hand, HandPair};
use handlink_listener::{StatsSnapshot, TrackingListener};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::device::ControllerDevice;
use crate::host::{DeviceIndex, HostRuntime};

/// Host indices for the controllers; index 0 belongs to the headset.
const LEFT_DEVICE_INDEX: DeviceIndex = 1;
const RIGHT_DEVICE_INDEX: DeviceIndex = 2;

pub struct Driver {
    left: ControllerDevice,
    right: ControllerDevice,
    listener: TrackingListener,
    host: Arc<dyn HostRuntime>,
}

impl Driver {
    pub fn new(config: &Config, host: Arc<dyn HostRuntime>) -> Self {
        let hands = HandPair::new();
        let period = config.publisher.period();

        let left = ControllerDevice::new(
            Hand::Left,
            config.devices.left_serial.clone(),
            hands.left.clone(),
            host.clone(),
            period,
        );
        let right = ControllerDevice::new(
            Hand::Right,
            config.devices.right_serial.clone(),
            hands.right.clone(),
            host.clone(),
            period,
        );
        let listener = TrackingListener::new(hands, config.listener.to_listener_config());

        Self {
            left,
            right,
            listener,
            host,
        }
    }

    pub fn device(&self, hand: Hand) -> &ControllerDevice {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn listener_stats(&self) -> StatsSnapshot {
        self.listener.stats()
    }

    /// Activate both controllers and start listening on `port`
    ///
    /// Returns the listening address, or `None` if the port could not be
    /// bound. The controllers keep publishing their default pose either way.
    pub async fn start(&mut self, port: u16) -> Option<SocketAddr> {
        self.left.activate(LEFT_DEVICE_INDEX);
        self.right.activate(RIGHT_DEVICE_INDEX);

        match self.listener.start(port).await {
            Ok(addr) => {
                info!(address = %addr, "Hand tracking enabled");
                Some(addr)
            }
            Err(e) => {
                warn!(error = %e, "Hand tracking listener failed to start, continuing without it");
                self.host
                    .log(&format!("Hand tracking unavailable: {}", e));
                None
            }
        }
    }

    /// Stop the listener, then both publishers
    pub async fn shutdown(&mut self) {
        self.listener.stop().await;
        self.left.deactivate().await;
        self.right.deactivate().await;
        info!("Driver shut down");
    }
}
