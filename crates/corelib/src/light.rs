//! Light models evaluated once per vertex when meshes are baked.
//!
//! Every model returns the color contribution for a single surface sample;
//! [`shade`] sums the contributions of several lights without clamping, so
//! bright overlapping lights are allowed to over-saturate.

use crate::Vec3;

/// How a point light fades across a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointFalloff {
    /// Lambert term only: `clamp(dot(L, N), 0, 1)`.
    #[default]
    Lambert,
    /// Distance only: full strength inside `radius`, fading to zero one unit past it.
    Attenuated,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Points from the surface toward the light. Used as given; its length scales the ratio.
    pub direction: Vec3,
    pub color: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub radius: f32,
    pub falloff: PointFalloff,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub color: Vec3,
    /// Axis of the cone, pointing away from the light.
    pub cone_direction: Vec3,
    /// Cosine threshold: samples at or outside it get nothing.
    pub cone_ratio: f32,
    /// Cosine where the edge falloff starts.
    pub inner_cone_ratio: f32,
    /// Cosine where the edge falloff reaches zero.
    pub outer_cone_ratio: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// Surface sample in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

#[inline]
fn saturate(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self { direction, color }
    }

    pub fn intensity(&self, normal: Vec3) -> f32 {
        saturate(self.direction.dot(normal))
    }

    pub fn contribution(&self, surface: &Surface) -> Vec3 {
        self.intensity(surface.normal) * self.color * surface.color
    }
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            color,
            radius,
            falloff: PointFalloff::Lambert,
        }
    }

    pub fn attenuated(mut self) -> Self {
        self.falloff = PointFalloff::Attenuated;
        self
    }

    /// `1 - clamp(distance - radius, 0, 1)`.
    pub fn attenuation(&self, surface_position: Vec3) -> f32 {
        1.0 - saturate(self.position.distance(surface_position) - self.radius)
    }

    pub fn intensity(&self, surface_position: Vec3, normal: Vec3) -> f32 {
        match self.falloff {
            PointFalloff::Lambert => {
                let to_light = (self.position - surface_position).normalize_or_zero();
                saturate(to_light.dot(normal))
            }
            PointFalloff::Attenuated => self.attenuation(surface_position),
        }
    }

    pub fn contribution(&self, surface: &Surface) -> Vec3 {
        self.intensity(surface.position, surface.normal) * self.color * surface.color
    }
}

impl SpotLight {
    /// Cone test times edge falloff, ignoring the surface orientation.
    pub fn cone_factor(&self, surface_position: Vec3) -> f32 {
        let to_light = (self.position - surface_position).normalize_or_zero();
        let surface_ratio = saturate((-to_light).dot(self.cone_direction.normalize_or_zero()));
        if surface_ratio <= self.cone_ratio {
            return 0.0;
        }
        let span = self.inner_cone_ratio - self.outer_cone_ratio;
        if span.abs() <= f32::EPSILON {
            return 1.0;
        }
        1.0 - saturate((self.inner_cone_ratio - surface_ratio) / span)
    }

    pub fn intensity(&self, surface_position: Vec3, normal: Vec3) -> f32 {
        let cone = self.cone_factor(surface_position);
        if cone == 0.0 {
            return 0.0;
        }
        let to_light = (self.position - surface_position).normalize_or_zero();
        cone * saturate(to_light.dot(normal))
    }

    pub fn contribution(&self, surface: &Surface) -> Vec3 {
        self.intensity(surface.position, surface.normal) * self.color * surface.color
    }
}

impl Light {
    pub fn contribution(&self, surface: &Surface) -> Vec3 {
        match self {
            Light::Directional(l) => l.contribution(surface),
            Light::Point(l) => l.contribution(surface),
            Light::Spot(l) => l.contribution(surface),
        }
    }

    /// The field a [`crate::animator::LightAnimator`] drives: direction for
    /// directional lights, position otherwise.
    pub fn animated_field(&self) -> Vec3 {
        match self {
            Light::Directional(l) => l.direction,
            Light::Point(l) => l.position,
            Light::Spot(l) => l.position,
        }
    }

    pub fn set_animated_field(&mut self, value: Vec3) {
        match self {
            Light::Directional(l) => l.direction = value,
            Light::Point(l) => l.position = value,
            Light::Spot(l) => l.position = value,
        }
    }
}

impl From<DirectionalLight> for Light {
    fn from(l: DirectionalLight) -> Self {
        Light::Directional(l)
    }
}

impl From<PointLight> for Light {
    fn from(l: PointLight) -> Self {
        Light::Point(l)
    }
}

impl From<SpotLight> for Light {
    fn from(l: SpotLight) -> Self {
        Light::Spot(l)
    }
}

/// Sum of every light's contribution. An empty light list leaves the surface
/// color untouched.
pub fn shade<'a>(lights: impl IntoIterator<Item = &'a Light>, surface: &Surface) -> Vec3 {
    let mut lit = false;
    let mut sum = Vec3::ZERO;
    for light in lights {
        lit = true;
        sum += light.contribution(surface);
    }
    if lit { sum } else { surface.color }
}
