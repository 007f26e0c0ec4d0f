//! Core types: math re-exports, Transform, Camera, lights and the entity world.

pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4, vec3};

pub mod animator;
pub mod camera;
pub mod ecs;
pub mod error;
pub mod input;
pub mod light;
pub mod transform;

pub use error::{CoreError, CoreResult};
