//! Hand-tracked controller device

use handlink_core::{compose_pose, DevicePose, Hand, HandState, InputFrame};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::host::{DeviceIndex, HostRuntime};
use crate::publisher::PosePublisher;

/// One virtual controller backed by a [`HandState`]
pub struct ControllerDevice {
    hand: Hand,
    serial: String,
    state: Arc<HandState>,
    host: Arc<dyn HostRuntime>,
    period: Duration,
    index: Option<DeviceIndex>,
    publisher: Option<PosePublisher>,
}

impl ControllerDevice {
    pub fn new(
        hand: Hand,
        serial: impl Into<String>,
        state: Arc<HandState>,
        host: Arc<dyn HostRuntime>,
        period: Duration,
    ) -> Self {
        Self {
            hand,
            serial: serial.into(),
            state,
            host,
            period,
            index: None,
            publisher: None,
        }
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn index(&self) -> Option<DeviceIndex> {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.publisher.as_ref().is_some_and(PosePublisher::is_running)
    }

    /// Record the host index and start publishing poses
    pub fn activate(&mut self, index: DeviceIndex) {
        if self.is_active() {
            warn!(hand = %self.hand, index = index, "Device already active");
            return;
        }

        self.index = Some(index);
        self.publisher = Some(PosePublisher::spawn(
            index,
            self.state.clone(),
            self.host.clone(),
            self.period,
        ));
        info!(hand = %self.hand, serial = %self.serial, index = index, "Controller activated");
    }

    /// Stop publishing; returns once the publisher task has exited
    pub async fn deactivate(&mut self) {
        if let Some(mut publisher) = self.publisher.take() {
            publisher.stop().await;
            info!(hand = %self.hand, serial = %self.serial, "Controller deactivated");
        }
        self.index = None;
    }

    pub fn enter_standby(&self) {
        self.host
            .log(&format!("{} hand has been put on standby", self.hand_name()));
    }

    /// Pose from the current head frame and hand state
    pub fn get_pose(&self) -> DevicePose {
        compose_pose(&self.host.reference_frame(), &self.state.snapshot())
    }

    pub fn input_frame(&self) -> InputFrame {
        InputFrame::from_snapshot(&self.state.snapshot())
    }

    pub fn update_position(&self, x: f32, y: f32, z: f32) {
        self.state.set_position(x, y, z);
    }

    pub fn update_orientation(&self, w: f32, x: f32, y: f32, z: f32) {
        self.state.set_orientation(w, x, y, z);
    }

    pub fn update_trigger(&self, value: f32) {
        self.state.set_trigger(value);
    }

    pub fn update_grip(&self, value: f32) {
        self.state.set_grip(value);
    }

    fn hand_name(&self) -> &'static str {
        match self.hand {
            Hand::Left => "Left",
            Hand::Right => "Right",
        }
    }
}
