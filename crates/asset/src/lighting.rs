//! Bakes light contributions into vertex colors.
//!
//! The vertex color on input is the surface color; on output it is the sum of
//! every light's contribution, evaluated at the vertex's world position.

use corelib::light::{self, Light, Surface};
use corelib::transform::Transform;
use corelib::Vec3;

use crate::mesh::{MeshData, MeshVertex};

/// Light `unlit` into `lit`, vertex by vertex. Both slices must be the same length.
pub fn bake_into(unlit: &[MeshVertex], lit: &mut [MeshVertex], lights: &[Light], placement: &Transform) {
    debug_assert_eq!(unlit.len(), lit.len());
    let model = placement.matrix();
    let normal_matrix = placement.normal_matrix();

    for (src, dst) in unlit.iter().zip(lit.iter_mut()) {
        let surface = Surface {
            position: model.transform_point3(Vec3::from(src.position)),
            normal: (normal_matrix * Vec3::from(src.normal)).normalize_or_zero(),
            color: Vec3::from(src.color),
        };
        dst.color = light::shade(lights, &surface).to_array();
    }
}

/// In-place variant for meshes that are baked once and never re-lit.
pub fn bake(mesh: &mut MeshData, lights: &[Light], placement: &Transform) {
    if lights.is_empty() {
        return;
    }
    let unlit = mesh.vertices.clone();
    bake_into(&unlit, &mut mesh.vertices, lights, placement);
    log::debug!(
        "Baked {} light(s) into {} vertices",
        lights.len(),
        mesh.vertices.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::light::{DirectionalLight, PointLight};
    use corelib::vec3;

    fn quad_facing(normal: [f32; 3]) -> MeshData {
        let v = MeshVertex::new([0.0, 0.0, 0.0], normal, [0.0, 0.0]).with_color([0.5, 1.0, 0.25]);
        MeshData::from_vertices(vec![v; 3])
    }

    #[test]
    fn directional_bake_matches_formula() {
        let mut mesh = quad_facing([0.0, 1.0, 0.0]);
        let lights = [Light::from(DirectionalLight::new(Vec3::Y, vec3(0.5, 0.5, 0.5)))];
        bake(&mut mesh, &lights, &Transform::identity());
        for v in &mesh.vertices {
            assert_eq!(v.color, [0.25, 0.5, 0.125]);
        }
    }

    #[test]
    fn facing_away_goes_black() {
        let mut mesh = quad_facing([0.0, -1.0, 0.0]);
        let lights = [Light::from(DirectionalLight::new(Vec3::Y, Vec3::ONE))];
        bake(&mut mesh, &lights, &Transform::identity());
        assert!(mesh.vertices.iter().all(|v| v.color == [0.0, 0.0, 0.0]));
    }

    #[test]
    fn placement_moves_vertices_into_world_space() {
        // Attenuated point light at x=5 with radius 1: a vertex at the origin is
        // 5 units away (dark) until the placement moves it next to the light.
        let lights = [Light::from(PointLight::new(vec3(5.0, 0.0, 0.0), Vec3::ONE, 1.0).attenuated())];

        let mut far = quad_facing([0.0, 1.0, 0.0]);
        bake(&mut far, &lights, &Transform::identity());
        assert_eq!(far.vertices[0].color, [0.0, 0.0, 0.0]);

        let mut near = quad_facing([0.0, 1.0, 0.0]);
        bake(&mut near, &lights, &Transform::from_translation(vec3(4.5, 0.0, 0.0)));
        assert_eq!(near.vertices[0].color, [0.5, 1.0, 0.25]);
    }

    #[test]
    fn rebake_starts_from_unlit_colors() {
        let unlit = quad_facing([0.0, 1.0, 0.0]);
        let mut lit = unlit.clone();
        let lights = [Light::from(DirectionalLight::new(Vec3::Y, Vec3::ONE))];
        bake_into(&unlit.vertices, &mut lit.vertices, &lights, &Transform::identity());
        bake_into(&unlit.vertices, &mut lit.vertices, &lights, &Transform::identity());
        assert_eq!(lit.vertices[0].color, [0.5, 1.0, 0.25]);
    }

    #[test]
    fn no_lights_leaves_colors() {
        let mut mesh = quad_facing([0.0, 1.0, 0.0]);
        bake(&mut mesh, &[], &Transform::identity());
        assert_eq!(mesh.vertices[0].color, [0.5, 1.0, 0.25]);
    }
}
