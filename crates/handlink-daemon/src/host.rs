//! Host runtime capability
//!
//! Devices submit poses and input values to a host and read the head
//! reference frame from it. The VR runtime binding implements this trait;
//! [`StaticHost`] stands in when running without one.

use handlink_core::{DevicePose, InputFrame, ReferenceFrame};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, trace};

/// Index the host assigned to a tracked device
pub type DeviceIndex = u32;

pub trait HostRuntime: Send + Sync + 'static {
    /// Publish a freshly composed pose for a device
    fn submit_pose(&self, device: DeviceIndex, pose: &DevicePose);

    /// Current head pose used as the basis for hand offsets
    fn reference_frame(&self) -> ReferenceFrame;

    /// Publish controller input values
    fn submit_input(&self, _device: DeviceIndex, _input: &InputFrame) {}

    fn log(&self, message: &str) {
        info!(target: "handlink::host", "{}", message);
    }
}

/// Host with a fixed head pose that logs what it receives
pub struct StaticHost {
    reference: ReferenceFrame,
    poses: AtomicU64,
}

impl StaticHost {
    pub fn new(reference: ReferenceFrame) -> Self {
        Self {
            reference,
            poses: AtomicU64::new(0),
        }
    }

    /// Number of poses submitted so far
    pub fn poses_submitted(&self) -> u64 {
        self.poses.load(Ordering::Relaxed)
    }
}

impl HostRuntime for StaticHost {
    fn submit_pose(&self, device: DeviceIndex, pose: &DevicePose) {
        self.poses.fetch_add(1, Ordering::Relaxed);
        trace!(
            device = device,
            x = pose.position.x,
            y = pose.position.y,
            z = pose.position.z,
            qw = pose.orientation.w,
            qx = pose.orientation.x,
            qy = pose.orientation.y,
            qz = pose.orientation.z,
            "Pose updated"
        );
    }

    fn reference_frame(&self) -> ReferenceFrame {
        self.reference
    }

    fn submit_input(&self, device: DeviceIndex, input: &InputFrame) {
        trace!(
            device = device,
            trigger = input.trigger_value,
            trigger_click = input.trigger_click,
            grip = input.grip_value,
            "Input updated"
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Host that records every call for assertions
    #[derive(Default)]
    pub struct RecordingHost {
        pub reference: Mutex<ReferenceFrame>,
        pub poses: Mutex<Vec<(DeviceIndex, DevicePose)>>,
        pub inputs: Mutex<Vec<(DeviceIndex, InputFrame)>>,
        pub messages: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        pub fn pose_count(&self) -> usize {
            self.poses.lock().unwrap().len()
        }

        pub fn poses_for(&self, device: DeviceIndex) -> Vec<DevicePose> {
            self.poses
                .lock()
                .unwrap()
                .iter()
                .filter(|(d, _)| *d == device)
                .map(|(_, p)| *p)
                .collect()
        }

        pub fn last_pose(&self, device: DeviceIndex) -> Option<DevicePose> {
            self.poses_for(device).last().copied()
        }
    }

    impl HostRuntime for RecordingHost {
        fn submit_pose(&self, device: DeviceIndex, pose: &DevicePose) {
            self.poses.lock().unwrap().push((device, *pose));
        }

        fn reference_frame(&self) -> ReferenceFrame {
            *self.reference.lock().unwrap()
        }

        fn submit_input(&self, device: DeviceIndex, input: &InputFrame) {
            self.inputs.lock().unwrap().push((device, *input));
        }

        fn log(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}
