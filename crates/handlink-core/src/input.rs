//! Controller input values derived from hand state

use crate::hand::HandSnapshot;

/// Trigger value above which the trigger counts as clicked
pub const TRIGGER_CLICK_THRESHOLD: f32 = 0.5;

/// Input component values for one controller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputFrame {
    pub trigger_value: f32,
    pub trigger_click: bool,
    pub grip_value: f32,
    /// No gesture maps to the A button yet, so these stay released.
    pub a_click: bool,
    pub a_touch: bool,
}

impl InputFrame {
    pub fn from_snapshot(hand: &HandSnapshot) -> Self {
        Self {
            trigger_value: hand.trigger,
            trigger_click: hand.trigger > TRIGGER_CLICK_THRESHOLD,
            grip_value: hand.grip,
            a_click: false,
            a_touch: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_click_threshold() {
        let mut hand = HandSnapshot::default();
        hand.trigger = 0.5;
        assert!(!InputFrame::from_snapshot(&hand).trigger_click);

        hand.trigger = 0.51;
        let frame = InputFrame::from_snapshot(&hand);
        assert!(frame.trigger_click);
        assert_eq!(frame.trigger_value, 0.51);
    }

    #[test]
    fn test_grip_passes_through() {
        let hand = HandSnapshot {
            grip: 0.9,
            ..Default::default()
        };
        let frame = InputFrame::from_snapshot(&hand);
        assert_eq!(frame.grip_value, 0.9);
        assert!(!frame.a_click);
        assert!(!frame.a_touch);
    }
}
