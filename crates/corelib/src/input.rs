//! Host-provided input snapshot consumed by the camera each tick.

use crate::Vec2;

/// Held movement keys. Opposite keys may both be held; they cancel out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    /// W
    pub forward: bool,
    /// S
    pub back: bool,
    /// A
    pub left: bool,
    /// D
    pub right: bool,
    /// Space
    pub up: bool,
    /// X
    pub down: bool,
}

impl MoveKeys {
    #[inline]
    const fn axis(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Local-space direction (x = right, y = up, z = forward), not normalized.
    pub fn direction(&self) -> crate::Vec3 {
        crate::vec3(
            Self::axis(self.right, self.left),
            Self::axis(self.up, self.down),
            Self::axis(self.forward, self.back),
        )
    }

    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }
}

/// Pointer position in window pixels plus the look button.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub look_held: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    pub keys: MoveKeys,
    /// `None` until the pointer has entered the window.
    pub pointer: Option<PointerState>,
}
