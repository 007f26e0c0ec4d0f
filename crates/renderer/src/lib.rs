//! Renderer: wgpu device state, the scene pipeline and the per-frame
//! update/render cycle.
//! wgpu = 26.x, winit = 0.30.x

pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod scene_renderer;
pub mod viewport;

pub use scene_renderer::{RendererConfig, SceneRenderer};
