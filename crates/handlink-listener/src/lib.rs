//! Handlink Listener - Network ingestion of hand tracking data
//!
//! This crate accepts a single loopback TCP client streaming the line
//! protocol and applies each message to the shared hand state:
//! - Line framing over an arbitrary byte stream
//! - Field-group dispatch into the left or right hand
//! - The listener task and its start/stop lifecycle

pub mod dispatch;
pub mod framing;
pub mod listener;

pub use dispatch::{dispatch, DispatchReport, FieldGroup};
pub use framing::{Frames, LineBuffer};
pub use listener::{
    ListenerConfig, ListenerError, ListenerStats, StatsSnapshot, TrackingListener,
    DEFAULT_PORT,
};
