//! # Input Surface
//!
//! The simulation only asks two questions of the outside world: is an
//! action held, and where is the analog stick. Keyboards, touch joysticks
//! and replay files all reduce to [`InputSource`].

use canter_shared::Vec2;

/// Discrete actions the rider can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    /// Ride forward (trot, or gallop with [`Action::Gallop`]).
    Forward = 0,
    /// Back up slowly. Overrides forward.
    Backward = 1,
    /// Turn left.
    Left = 2,
    /// Turn right.
    Right = 3,
    /// Gallop modifier for forward.
    Gallop = 4,
    /// Interact with the nearest point of interest.
    Interact = 5,
}

impl Action {
    /// Every action, in bit order.
    pub const ALL: [Self; 6] = [
        Self::Forward,
        Self::Backward,
        Self::Left,
        Self::Right,
        Self::Gallop,
        Self::Interact,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Read-only view of the current input.
pub trait InputSource {
    /// True while `action` is held.
    fn is_pressed(&self, action: Action) -> bool;

    /// Analog stick, each axis in `[-1, 1]`. `x` steers, positive is right.
    fn analog(&self) -> Vec2;
}

/// Plain input snapshot: a held-action bitmask plus an analog stick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    held: u8,
    analog: Vec2,
}

impl InputState {
    /// No actions held, stick centered.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            held: 0,
            analog: Vec2::ZERO,
        }
    }

    /// Builder form of [`InputState::press`].
    #[must_use]
    pub fn with(mut self, action: Action) -> Self {
        self.press(action);
        self
    }

    /// Builder form of [`InputState::set_analog`].
    #[must_use]
    pub fn with_analog(mut self, x: f32, y: f32) -> Self {
        self.set_analog(x, y);
        self
    }

    /// Marks `action` as held.
    pub fn press(&mut self, action: Action) {
        self.held |= action.bit();
    }

    /// Marks `action` as released.
    pub fn release(&mut self, action: Action) {
        self.held &= !action.bit();
    }

    /// Sets the held state of `action`.
    pub fn set(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    /// Sets the stick, clamping each axis to `[-1, 1]`. Non-finite axes read as centered.
    pub fn set_analog(&mut self, x: f32, y: f32) {
        self.analog = Vec2::new(clamp_axis(x), clamp_axis(y));
    }

    /// Releases everything and centers the stick.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl InputSource for InputState {
    #[inline]
    fn is_pressed(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    #[inline]
    fn analog(&self) -> Vec2 {
        self.analog
    }
}

#[inline]
fn clamp_axis(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
