//! Ping-pong animation of a single light field between fixed bounds.

use crate::error::{CoreError, CoreResult};
use crate::light::Light;
use crate::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightAnimator {
    /// Index of the driven light in the scene's light list.
    pub light: usize,
    pub min: Vec3,
    pub max: Vec3,
    /// Units per second, per component.
    pub velocity: Vec3,
    value: Vec3,
}

impl LightAnimator {
    pub fn new(light: usize, start: Vec3, min: Vec3, max: Vec3, velocity: Vec3) -> CoreResult<Self> {
        if min.cmpgt(max).any() {
            return Err(CoreError::InvalidBounds {
                min: min.to_array(),
                max: max.to_array(),
            });
        }
        Ok(Self {
            light,
            min,
            max,
            velocity,
            value: start.clamp(min, max),
        })
    }

    #[inline]
    pub fn value(&self) -> Vec3 {
        self.value
    }

    /// Move by `velocity * dt`, reflecting off the bounds. Returns the new value.
    ///
    /// A non-finite step leaves that component where it is.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        for axis in 0..3 {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            let span = hi - lo;
            if span <= 0.0 {
                self.value[axis] = lo;
                continue;
            }
            let speed = self.velocity[axis].abs();
            let step = speed * dt;
            if !step.is_finite() {
                continue;
            }
            // Phase along one up-and-back cycle: [0, span] rising, (span, 2 span) falling.
            let period = 2.0 * span;
            let offset = (self.value[axis] - lo).clamp(0.0, span);
            let phase = if self.velocity[axis] < 0.0 { period - offset } else { offset };
            let phase = (phase + step).rem_euclid(period);
            if phase <= span {
                self.value[axis] = lo + phase;
                self.velocity[axis] = speed;
            } else {
                self.value[axis] = lo + (period - phase);
                self.velocity[axis] = -speed;
            }
        }
        self.value
    }

    /// Advance and write the result into the driven light.
    pub fn drive(&mut self, lights: &mut [Light], dt: f32) -> CoreResult<()> {
        let count = lights.len();
        let light = lights
            .get_mut(self.light)
            .ok_or(CoreError::UnknownLight { index: self.light, count })?;
        let value = self.advance(dt);
        light.set_animated_field(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::PointLight;
    use crate::vec3;

    fn bouncer() -> LightAnimator {
        LightAnimator::new(
            0,
            Vec3::ZERO,
            vec3(-3.0, 0.0, 0.0),
            vec3(3.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
        )
        .expect("valid bounds")
    }

    #[test]
    fn reflects_at_upper_bound() {
        let mut a = bouncer();
        assert_eq!(a.advance(1.0), vec3(2.0, 0.0, 0.0));
        assert_eq!(a.advance(1.0), vec3(2.0, 0.0, 0.0));
        assert_eq!(a.velocity.x, -2.0);
        assert_eq!(a.advance(1.0), vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn stays_within_bounds_for_large_steps() {
        let mut a = bouncer();
        for _ in 0..50 {
            let v = a.advance(7.3);
            assert!(v.x >= -3.0 && v.x <= 3.0, "escaped bounds: {v:?}");
        }
    }

    #[test]
    fn non_finite_or_huge_steps_terminate_in_bounds() {
        let mut a = bouncer();
        a.advance(1.0);
        assert_eq!(a.advance(f32::INFINITY), vec3(2.0, 0.0, 0.0));
        assert_eq!(a.advance(f32::NAN), vec3(2.0, 0.0, 0.0));

        a.velocity = vec3(f32::INFINITY, 0.0, 0.0);
        assert_eq!(a.advance(0.5), vec3(2.0, 0.0, 0.0));

        a.velocity = vec3(2.0, 0.0, 0.0);
        let v = a.advance(1.0e30);
        assert!(v.x >= -3.0 && v.x <= 3.0, "escaped bounds: {v:?}");
    }

    #[test]
    fn reflects_at_lower_bound() {
        let mut a = bouncer();
        a.velocity = vec3(-2.0, 0.0, 0.0);
        assert_eq!(a.advance(2.0), vec3(-2.0, 0.0, 0.0));
        assert_eq!(a.velocity.x, 2.0);
        assert_eq!(a.advance(1.0), vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = LightAnimator::new(0, Vec3::ZERO, Vec3::ONE, Vec3::ZERO, Vec3::X);
        assert!(matches!(err, Err(CoreError::InvalidBounds { .. })));
    }

    #[test]
    fn drives_point_light_position() {
        let mut lights = [Light::from(PointLight::new(Vec3::ZERO, Vec3::ONE, 1.0))];
        let mut a = bouncer();
        a.drive(&mut lights, 0.5).expect("light exists");
        assert_eq!(lights[0].animated_field(), vec3(1.0, 0.0, 0.0));

        a.light = 4;
        assert!(matches!(
            a.drive(&mut lights, 0.5),
            Err(CoreError::UnknownLight { index: 4, count: 1 })
        ));
    }
}
