//! Per-hand tracking state shared between the listener and pose publishers
//!
//! Every field is an independent atomic cell. Writers never block readers and
//! readers never block writers. A reader may observe a mix of old and new
//! components while a multi-field update is in flight, so an orientation read
//! mid-update can be briefly non-unit. The next update corrects it.

use glam::{Quat, Vec3};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Which hand a message or device refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    /// Protocol spelling of the hand
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "LEFT",
            Hand::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Hand {
    type Err = ();

    /// Exact, case-sensitive match on `LEFT` / `RIGHT`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEFT" => Ok(Hand::Left),
            "RIGHT" => Ok(Hand::Right),
            _ => Err(()),
        }
    }
}

/// `f32` stored in an `AtomicU32` by bit pattern
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Latest known tracking values for one hand
pub struct HandState {
    pos_x: AtomicF32,
    pos_y: AtomicF32,
    pos_z: AtomicF32,
    rot_w: AtomicF32,
    rot_x: AtomicF32,
    rot_y: AtomicF32,
    rot_z: AtomicF32,
    trigger: AtomicF32,
    grip: AtomicF32,
}

impl HandState {
    /// Neutral state: origin, identity rotation, trigger and grip released
    pub fn new() -> Self {
        Self {
            pos_x: AtomicF32::new(0.0),
            pos_y: AtomicF32::new(0.0),
            pos_z: AtomicF32::new(0.0),
            rot_w: AtomicF32::new(1.0),
            rot_x: AtomicF32::new(0.0),
            rot_y: AtomicF32::new(0.0),
            rot_z: AtomicF32::new(0.0),
            trigger: AtomicF32::new(0.0),
            grip: AtomicF32::new(0.0),
        }
    }

    pub fn set_position(&self, x: f32, y: f32, z: f32) {
        self.pos_x.store(x);
        self.pos_y.store(y);
        self.pos_z.store(z);
    }

    /// Store a rotation given as `(w, x, y, z)`; not normalized
    pub fn set_orientation(&self, w: f32, x: f32, y: f32, z: f32) {
        self.rot_w.store(w);
        self.rot_x.store(x);
        self.rot_y.store(y);
        self.rot_z.store(z);
    }

    pub fn set_trigger(&self, value: f32) {
        self.trigger.store(value);
    }

    pub fn set_grip(&self, value: f32) {
        self.grip.store(value);
    }

    /// Point-in-time copy of every field
    pub fn snapshot(&self) -> HandSnapshot {
        HandSnapshot {
            position: Vec3::new(self.pos_x.load(), self.pos_y.load(), self.pos_z.load()),
            orientation: Quat::from_xyzw(
                self.rot_x.load(),
                self.rot_y.load(),
                self.rot_z.load(),
                self.rot_w.load(),
            ),
            trigger: self.trigger.load(),
            grip: self.grip.load(),
        }
    }
}

impl Default for HandState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandState").field(&self.snapshot()).finish()
    }
}

/// Plain copy of a [`HandState`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSnapshot {
    pub position: Vec3,
    pub orientation: Quat,
    pub trigger: f32,
    pub grip: f32,
}

impl Default for HandSnapshot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            trigger: 0.0,
            grip: 0.0,
        }
    }
}

/// The two hand states, shared by reference count
#[derive(Debug, Clone, Default)]
pub struct HandPair {
    pub left: Arc<HandState>,
    pub right: Arc<HandState>,
}

impl HandPair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hand: Hand) -> &Arc<HandState> {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_initial_state() {
        let state = HandState::new();
        assert_eq!(state.snapshot(), HandSnapshot::default());
    }

    #[test]
    fn test_setters_update_only_their_fields() {
        let state = HandState::new();
        state.set_position(1.0, 2.0, 3.0);
        state.set_trigger(0.75);

        let snap = state.snapshot();
        assert_eq!(snap.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(snap.orientation, Quat::IDENTITY);
        assert_eq!(snap.trigger, 0.75);
        assert_eq!(snap.grip, 0.0);

        state.set_orientation(0.0, 0.0, 1.0, 0.0);
        state.set_grip(0.5);
        let snap = state.snapshot();
        assert_eq!(snap.orientation, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0));
        assert_eq!(snap.grip, 0.5);
        assert_eq!(snap.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_values_are_not_clamped() {
        let state = HandState::new();
        state.set_trigger(1.5);
        state.set_grip(-0.25);
        let snap = state.snapshot();
        assert_eq!(snap.trigger, 1.5);
        assert_eq!(snap.grip, -0.25);
    }

    #[test]
    fn test_hand_from_str() {
        assert_eq!("LEFT".parse::<Hand>(), Ok(Hand::Left));
        assert_eq!("RIGHT".parse::<Hand>(), Ok(Hand::Right));
        assert!("left".parse::<Hand>().is_err());
        assert!("".parse::<Hand>().is_err());
        assert_eq!(Hand::Right.to_string(), "RIGHT");
    }

    #[test]
    fn test_hand_pair_routes_to_distinct_states() {
        let hands = HandPair::new();
        hands.get(Hand::Left).set_grip(1.0);
        assert_eq!(hands.left.snapshot().grip, 1.0);
        assert_eq!(hands.right.snapshot().grip, 0.0);
        assert!(!Arc::ptr_eq(&hands.left, &hands.right));
    }

    #[test]
    fn test_concurrent_writers_do_not_interfere() {
        let state = Arc::new(HandState::new());

        let trigger_writer = {
            let state = state.clone();
            thread::spawn(move || {
                for i in 0..10_000 {
                    state.set_trigger((i % 2) as f32);
                }
            })
        };
        let position_writer = {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    state.set_position(1.0, 2.0, 3.0);
                }
            })
        };
        let reader = {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    let snap = state.snapshot();
                    assert_eq!(snap.grip, 0.0);
                    assert_eq!(snap.orientation, Quat::IDENTITY);
                    assert!(snap.trigger == 0.0 || snap.trigger == 1.0);
                }
            })
        };

        trigger_writer.join().unwrap();
        position_writer.join().unwrap();
        reader.join().unwrap();

        let snap = state.snapshot();
        assert_eq!(snap.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(snap.trigger, 1.0);
        assert_eq!(snap.grip, 0.0);
        assert_eq!(snap.orientation, Quat::IDENTITY);
    }
}
