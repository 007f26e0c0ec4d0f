//! CPU-side mesh representation used by loaders and the light baker.

/// Vertex with position/normal/uv/color. Position and normal are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Surface color before baking, lit color after.
    pub color: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: [1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }
}

/// Triangle list with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Non-indexed stream: every vertex is used once, in order.
    pub fn from_vertices(vertices: Vec<MeshVertex>) -> Self {
        let indices = (0..vertices.len() as u32).collect();
        Self { vertices, indices }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Move the UV origin from bottom-left (OBJ) to top-left (GPU textures).
    pub fn flip_v(&mut self) {
        for v in &mut self.vertices {
            v.uv[1] = 1.0 - v.uv[1];
        }
    }

    /// Paint every vertex with one surface color.
    pub fn set_color(&mut self, color: [f32; 3]) {
        for v in &mut self.vertices {
            v.color = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_data_validity() {
        let data = MeshData::new(vec![MeshVertex::default()], vec![0]);
        assert!(data.is_valid());
        assert!(!MeshData::default().is_valid());
    }

    #[test]
    fn from_vertices_builds_trivial_indices() {
        let data = MeshData::from_vertices(vec![MeshVertex::default(); 6]);
        assert_eq!(data.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(data.triangle_count(), 2);
    }

    #[test]
    fn flip_v_mirrors_texture_rows() {
        let mut data = MeshData::from_vertices(vec![MeshVertex::new([0.0; 3], [0.0; 3], [0.25, 0.25])]);
        data.flip_v();
        assert_eq!(data.vertices[0].uv, [0.25, 0.75]);
    }
}
