//! Tiny ECS: World, Entity, components: Transform + Renderable.

use crate::error::{CoreError, CoreResult};
use crate::transform::Transform;
use crate::Vec3;

/// Entity id (dense, index into component arrays).
pub type Entity = u32;

/// Index into the scene's mesh registry.
pub type MeshId = usize;

/// Per-frame motion of a renderable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Motion {
    #[default]
    Static,
    /// Spin about a principal axis; the angle wraps at a full turn.
    Spin { axis: SpinAxis, degrees_per_second: f32 },
    /// Keep centered on the camera (skybox).
    FollowCamera,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinAxis {
    X,
    Y,
    Z,
}

impl SpinAxis {
    fn euler(self, radians: f32) -> Vec3 {
        match self {
            SpinAxis::X => Vec3::new(radians, 0.0, 0.0),
            SpinAxis::Y => Vec3::new(0.0, radians, 0.0),
            SpinAxis::Z => Vec3::new(0.0, 0.0, radians),
        }
    }
}

/// Renderable component: which mesh to draw and how it moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable {
    pub mesh: MeshId,
    pub motion: Motion,
}

/// Very small ECS world with dense parallel arrays.
/// No allocations per-frame; spawn may allocate to grow capacity.
#[derive(Default)]
pub struct World {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
    alive: Vec<bool>,
    len: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn entity with Transform and optional Renderable.
    pub fn spawn(&mut self, t: Transform, r: Option<Renderable>) -> Entity {
        let id = self.len;
        let idx = id as usize;
        self.len += 1;

        if idx >= self.transforms.len() {
            // grow all arrays equally
            let new_len = (idx + 1).next_power_of_two().max(8);
            self.transforms.resize(new_len, Transform::identity());
            self.renderables.resize(new_len, None);
            self.alive.resize(new_len, false);
        }

        self.transforms[idx] = t;
        self.renderables[idx] = r;
        self.alive[idx] = true;
        id
    }

    /// Remove an entity; its slot is not reused.
    pub fn despawn(&mut self, e: Entity) -> CoreResult<()> {
        if !self.is_alive(e) {
            return Err(CoreError::UnknownEntity(e));
        }
        let i = e as usize;
        self.alive[i] = false;
        self.renderables[i] = None;
        Ok(())
    }

    #[inline]
    pub fn is_alive(&self, e: Entity) -> bool {
        let i = e as usize;
        i < self.alive.len() && self.alive[i]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn transform(&self, e: Entity) -> Option<&Transform> {
        self.is_alive(e).then(|| &self.transforms[e as usize])
    }

    /// Iterate over (Entity, Transform, Renderable) triples.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (Entity, &Transform, &Renderable)> {
        // No alloc: filter by alive + has Some(Renderable)
        (0..self.len as usize).filter_map(move |i| {
            if self.alive.get(i).copied().unwrap_or(false) {
                if let Some(r) = self.renderables[i].as_ref() {
                    return Some((i as Entity, &self.transforms[i], r));
                }
            }
            None
        })
    }

    /// Set every spinning entity's angle from the total elapsed time.
    pub fn system_spin(&mut self, total_seconds: f64) {
        for i in 0..(self.len as usize) {
            if !self.alive[i] {
                continue;
            }
            if let Some(Renderable {
                motion: Motion::Spin { axis, degrees_per_second },
                ..
            }) = self.renderables[i]
            {
                let total = total_seconds * f64::from(degrees_per_second.to_radians());
                let radians = total.rem_euclid(std::f64::consts::TAU) as f32;
                self.transforms[i].rotation_euler = axis.euler(radians);
            }
        }
    }

    /// Move camera-following entities onto the camera position.
    pub fn system_follow_camera(&mut self, camera_position: Vec3) {
        for i in 0..(self.len as usize) {
            if self.alive[i]
                && matches!(
                    self.renderables[i],
                    Some(Renderable { motion: Motion::FollowCamera, .. })
                )
            {
                self.transforms[i].translation = camera_position;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    fn spinner(axis: SpinAxis) -> Option<Renderable> {
        Some(Renderable {
            mesh: 0,
            motion: Motion::Spin {
                axis,
                degrees_per_second: 90.0,
            },
        })
    }

    #[test]
    fn spawn_grows_and_iterates_renderables_only() {
        let mut world = World::new();
        for _ in 0..10 {
            world.spawn(Transform::identity(), spinner(SpinAxis::Y));
        }
        world.spawn(Transform::identity(), None);
        assert_eq!(world.len(), 11);
        assert_eq!(world.iter_renderables().count(), 10);
    }

    #[test]
    fn spin_wraps_at_full_turn() {
        let mut world = World::new();
        let e = world.spawn(Transform::from_translation(vec3(3.0, 0.0, 0.0)), spinner(SpinAxis::X));
        // 5 s at 90 deg/s is 450 deg, i.e. a quarter turn past a full one.
        world.system_spin(5.0);
        let t = world.transform(e).expect("alive");
        assert!((t.rotation_euler.x - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(t.rotation_euler.y, 0.0);
        assert_eq!(t.translation, vec3(3.0, 0.0, 0.0));
    }

    #[test]
    fn follow_camera_moves_only_followers() {
        let mut world = World::new();
        let sky = world.spawn(
            Transform::identity(),
            Some(Renderable {
                mesh: 1,
                motion: Motion::FollowCamera,
            }),
        );
        let rock = world.spawn(Transform::identity(), Some(Renderable { mesh: 2, motion: Motion::Static }));
        world.system_follow_camera(vec3(1.0, 2.0, 3.0));
        assert_eq!(world.transform(sky).map(|t| t.translation), Some(vec3(1.0, 2.0, 3.0)));
        assert_eq!(world.transform(rock).map(|t| t.translation), Some(Vec3::ZERO));
    }

    #[test]
    fn despawn_hides_entity() {
        let mut world = World::new();
        let e = world.spawn(Transform::identity(), spinner(SpinAxis::Z));
        world.despawn(e).expect("alive");
        assert!(!world.is_alive(e));
        assert!(matches!(world.despawn(e), Err(CoreError::UnknownEntity(_))));
        assert!(world.is_empty());
    }
}
