//! Routing of parsed messages into hand state
//!
//! A message is applied to the hand named by its `HAND` field. Its numeric
//! fields form groups that are applied only when every member is present and
//! parses cleanly, so a consistent position or rotation is never overwritten
//! by a partial one.

use handlink_core::protocol::{
    FIELD_GRIP, FIELD_HAND, FIELD_QW, FIELD_QX, FIELD_QY, FIELD_QZ, FIELD_TRIGGER, FIELD_X,
    FIELD_Y, FIELD_Z,
};
use handlink_core::{FieldError, Hand, HandPair, HandState, ProtocolMessage};
use std::fmt;
use tracing::{debug, trace};

/// Fields that are written to hand state together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Position,
    Orientation,
    Trigger,
    Grip,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 4] = [
        FieldGroup::Position,
        FieldGroup::Orientation,
        FieldGroup::Trigger,
        FieldGroup::Grip,
    ];

    /// Protocol keys belonging to this group
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            FieldGroup::Position => &[FIELD_X, FIELD_Y, FIELD_Z],
            FieldGroup::Orientation => &[FIELD_QW, FIELD_QX, FIELD_QY, FIELD_QZ],
            FieldGroup::Trigger => &[FIELD_TRIGGER],
            FieldGroup::Grip => &[FIELD_GRIP],
        }
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldGroup::Position => "position",
            FieldGroup::Orientation => "orientation",
            FieldGroup::Trigger => "trigger",
            FieldGroup::Grip => "grip",
        };
        write!(f, "{}", name)
    }
}

/// What happened to one message
#[derive(Debug, Default, PartialEq)]
pub struct DispatchReport {
    /// Target hand, `None` if the message named no recognized hand
    pub hand: Option<Hand>,
    /// Groups written to hand state
    pub applied: Vec<FieldGroup>,
    /// Groups with only some of their fields present
    pub partial: Vec<FieldGroup>,
    /// Groups with a field that is not a finite number
    pub malformed: Vec<(FieldGroup, FieldError)>,
}

impl DispatchReport {
    pub fn is_ignored(&self) -> bool {
        self.hand.is_none()
    }
}

/// Apply a parsed message to the matching hand
pub fn dispatch(msg: &ProtocolMessage, hands: &HandPair) -> DispatchReport {
    let mut report = DispatchReport::default();

    let Some(hand) = msg.get(FIELD_HAND).and_then(|h| h.parse::<Hand>().ok()) else {
        trace!(fields = msg.len(), "Ignoring message without a recognized hand");
        return report;
    };
    report.hand = Some(hand);
    let state = hands.get(hand);

    for group in FieldGroup::ALL {
        match apply_group(msg, state, group) {
            GroupOutcome::Applied => report.applied.push(group),
            GroupOutcome::Absent => {}
            GroupOutcome::Partial => {
                debug!(hand = %hand, group = %group, "Dropping partial field group");
                report.partial.push(group);
            }
            GroupOutcome::Malformed(e) => {
                debug!(hand = %hand, group = %group, error = %e, "Dropping malformed field group");
                report.malformed.push((group, e));
            }
        }
    }

    report
}

enum GroupOutcome {
    Applied,
    Absent,
    Partial,
    Malformed(FieldError),
}

fn apply_group(msg: &ProtocolMessage, state: &HandState, group: FieldGroup) -> GroupOutcome {
    let outcome = match group {
        FieldGroup::Position => msg
            .parse_group([FIELD_X, FIELD_Y, FIELD_Z])
            .map(|r| r.map(|[x, y, z]| state.set_position(x, y, z))),
        FieldGroup::Orientation => msg
            .parse_group([FIELD_QW, FIELD_QX, FIELD_QY, FIELD_QZ])
            .map(|r| r.map(|[w, x, y, z]| state.set_orientation(w, x, y, z))),
        FieldGroup::Trigger => msg
            .parse_f32(FIELD_TRIGGER)
            .map(|r| r.map(|v| state.set_trigger(v))),
        FieldGroup::Grip => msg
            .parse_f32(FIELD_GRIP)
            .map(|r| r.map(|v| state.set_grip(v))),
    };

    match outcome {
        Some(Ok(())) => GroupOutcome::Applied,
        Some(Err(e)) => GroupOutcome::Malformed(e),
        None if group.fields().iter().any(|f| msg.contains(f)) => GroupOutcome::Partial,
        None => GroupOutcome::Absent,
    }
}
