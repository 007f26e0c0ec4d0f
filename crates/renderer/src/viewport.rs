//! Screen regions the scene is drawn into.

use glam::{Mat4, Vec3};

/// Offset applied to the second view in split mode.
pub const SECOND_VIEW_OFFSET: Vec3 = Vec3::new(0.0, -3.0, 5.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Right-multiplied onto the camera's view matrix.
    pub view_offset: Mat4,
}

impl Viewport {
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}

/// One full-size viewport, or left and right halves when `split` is set.
pub fn layout(width: u32, height: u32, split: bool) -> Vec<Viewport> {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    if !split {
        return vec![Viewport {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
            view_offset: Mat4::IDENTITY,
        }];
    }
    let half = w / 2.0;
    vec![
        Viewport {
            x: 0.0,
            y: 0.0,
            width: half,
            height: h,
            view_offset: Mat4::IDENTITY,
        },
        Viewport {
            x: half,
            y: 0.0,
            width: half,
            height: h,
            view_offset: Mat4::from_translation(SECOND_VIEW_OFFSET),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_view_covers_target() {
        let v = layout(1280, 720, false);
        assert_eq!(v.len(), 1);
        assert_eq!((v[0].width, v[0].height), (1280.0, 720.0));
        assert_eq!(v[0].view_offset, Mat4::IDENTITY);
    }

    #[test]
    fn split_halves_target_and_offsets_second_view() {
        let v = layout(1280, 720, true);
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].x, 640.0);
        assert_eq!(v[0].width + v[1].width, 1280.0);
        assert!((v[1].aspect() - 640.0 / 720.0).abs() < 1e-6);
        assert_eq!(v[1].view_offset.w_axis.truncate(), SECOND_VIEW_OFFSET);
    }

    #[test]
    fn zero_size_is_clamped() {
        let v = layout(0, 0, false);
        assert_eq!((v[0].width, v[0].height), (1.0, 1.0));
    }
}
