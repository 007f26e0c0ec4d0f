//! Built-in meshes that need no files on disk.

use crate::mesh::{MeshData, MeshVertex};

/// Unit cube (-0.5..0.5) colored by corner position, 8 shared vertices.
pub fn color_cube() -> MeshData {
    let corners: [[f32; 3]; 8] = [
        [-0.5, -0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, 0.5, 0.5],
        [0.5, -0.5, -0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, -0.5],
        [0.5, 0.5, 0.5],
    ];
    let vertices = corners
        .iter()
        .map(|&p| {
            let color = [p[0] + 0.5, p[1] + 0.5, p[2] + 0.5];
            let normal = [p[0] * 2.0, p[1] * 2.0, p[2] * 2.0];
            MeshVertex::new(p, normal, [0.0, 0.0]).with_color(color)
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 1, 3, 2, // -x
        4, 6, 5, 5, 6, 7, // +x
        0, 5, 1, 0, 4, 5, // -y
        2, 7, 6, 2, 3, 7, // +y
        0, 6, 4, 0, 2, 6, // -z
        1, 7, 3, 1, 5, 7, // +z
    ];
    MeshData::new(vertices, indices)
}

/// Flat grid on the XZ plane facing +Y, `size` units across and split into
/// `cells` x `cells` squares so per-vertex lighting has samples to work with.
/// UVs repeat once per unit.
pub fn floor_grid(size: f32, cells: u32, color: [f32; 3]) -> MeshData {
    let cells = cells.max(1);
    let h = size * 0.5;
    let step = size / cells as f32;
    let row = cells + 1;

    let mut vertices = Vec::with_capacity((row * row) as usize);
    for iz in 0..row {
        for ix in 0..row {
            let x = -h + ix as f32 * step;
            let z = -h + iz as f32 * step;
            vertices.push(MeshVertex::new([x, 0.0, z], [0.0, 1.0, 0.0], [x + h, z + h]).with_color(color));
        }
    }

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for iz in 0..cells {
        for ix in 0..cells {
            let a = iz * row + ix;
            let b = a + row;
            indices.extend_from_slice(&[a, b, b + 1, a, b + 1, a + 1]);
        }
    }
    MeshData::new(vertices, indices)
}

/// Cube seen from the inside, shaded from `horizon` at the bottom to `zenith`
/// at the top. Normals point inward.
pub fn sky_box(horizon: [f32; 3], zenith: [f32; 3]) -> MeshData {
    let mut mesh = color_cube();
    for v in &mut mesh.vertices {
        let t = v.position[1] + 0.5;
        v.color = [
            horizon[0] + (zenith[0] - horizon[0]) * t,
            horizon[1] + (zenith[1] - horizon[1]) * t,
            horizon[2] + (zenith[2] - horizon[2]) * t,
        ];
        v.normal = v.normal.map(|c| -c);
    }
    // Reverse winding so the inside faces are front faces.
    for tri in mesh.indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_twelve_triangles_over_eight_corners() {
        let cube = color_cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }

    #[test]
    fn floor_grid_faces_up() {
        let floor = floor_grid(10.0, 4, [0.5; 3]);
        assert_eq!(floor.vertices.len(), 25);
        assert_eq!(floor.triangle_count(), 32);
        assert!(floor.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        let last = floor.vertices.last().expect("non-empty");
        assert_eq!(last.position, [5.0, 0.0, 5.0]);
        assert_eq!(last.uv, [10.0, 10.0]);
        assert!(floor.indices.iter().all(|&i| (i as usize) < floor.vertices.len()));
    }

    #[test]
    fn sky_box_blends_top_to_bottom() {
        let sky = sky_box([0.0; 3], [1.0; 3]);
        for v in &sky.vertices {
            let expected = if v.position[1] > 0.0 { 1.0 } else { 0.0 };
            assert_eq!(v.color, [expected; 3]);
        }
        assert_eq!(&sky.indices[..3], &[0, 2, 1]);
    }
}
