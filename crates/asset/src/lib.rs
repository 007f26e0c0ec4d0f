//! Asset loading: OBJ meshes, textures, built-in primitives, vertex-light
//! baking and the background loader that feeds the renderer.

pub mod lighting;
pub mod loader;
pub mod mesh;
pub mod obj;
pub mod primitives;
pub mod scene;
pub mod texture;
