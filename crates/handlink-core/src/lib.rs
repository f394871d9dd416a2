//! Handlink Core - Protocol, hand state, and pose types
//!
//! This crate provides the building blocks shared by the listener and the
//! device driver:
//! - Line protocol parsing into key/value messages
//! - Lock-free per-hand state written by the listener and read by publishers
//! - Pose composition of a head reference frame with a tracked hand offset
//! - Controller input frames derived from hand state

pub mod hand;
pub mod input;
pub mod pose;
pub mod protocol;

pub use hand::{Hand, HandPair, HandSnapshot, HandState};
pub use input::InputFrame;
pub use pose::{compose_pose, DevicePose, ReferenceFrame, TrackingResult};
pub use protocol::{parse_line, FieldError, ProtocolMessage};

// Re-exported so downstream crates agree on the math types.
pub use glam::{Quat, Vec3};
