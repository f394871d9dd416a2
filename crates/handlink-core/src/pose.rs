//! Device pose composition
//!
//! A tracked hand is reported relative to the head. The device pose is the
//! hand offset rotated into world space by the head orientation and added to
//! the head position, with the hand rotation composed on top of the head
//! rotation.

use glam::{Quat, Vec3};

use crate::hand::HandSnapshot;

/// Head pose supplied by the host once per composition cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

/// Tracking quality reported alongside a pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingResult {
    Uninitialized,
    CalibratingInProgress,
    CalibratingOutOfRange,
    #[default]
    RunningOk,
    RunningOutOfRange,
}

/// Fully composed pose for one tracked device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevicePose {
    pub position: Vec3,
    pub orientation: Quat,
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
    pub tracking: TrackingResult,
}

/// Compose a device pose from the head reference frame and a hand snapshot
///
/// `orientation = reference * hand` and
/// `position = reference.position + reference.orientation * hand.position`.
pub fn compose_pose(reference: &ReferenceFrame, hand: &HandSnapshot) -> DevicePose {
    DevicePose {
        position: reference.position + reference.orientation * hand.position,
        orientation: reference.orientation * hand.orientation,
        pose_is_valid: true,
        device_is_connected: true,
        tracking: TrackingResult::RunningOk,
    }
}
