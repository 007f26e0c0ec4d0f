//! Scene description: which meshes exist, where they sit, and which lights
//! are baked into them.
//!
//! Every object becomes one renderable entity; its [`MeshId`] is its index in
//! [`SceneDesc::objects`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use corelib::animator::LightAnimator;
use corelib::ecs::{Entity, MeshId, Motion, Renderable, SpinAxis, World};
use corelib::light::{DirectionalLight, Light, PointLight, SpotLight};
use corelib::transform::Transform;
use corelib::{CoreError, CoreResult, Vec3, vec3};

use crate::lighting;
use crate::loader::{LoadSet, Pending};
use crate::mesh::MeshData;
use crate::obj;
use crate::primitives;
use crate::texture::TextureData;

const BEIGE: [f32; 3] = [0.933, 0.839, 0.568];
const PURPLE: [f32; 3] = [0.501, 0.0, 0.501];
const CUBE_DEGREES_PER_SECOND: f32 = 45.0;

#[derive(Clone, Debug, PartialEq)]
pub enum MeshSource {
    ColorCube,
    FloorGrid { size: f32, cells: u32 },
    SkyBox { horizon: [f32; 3], zenith: [f32; 3] },
    Obj(PathBuf),
}

#[derive(Clone, Debug)]
pub struct ObjectDesc {
    pub name: String,
    pub source: MeshSource,
    /// Sampled in the fragment stage and multiplied with the vertex color.
    pub texture: Option<PathBuf>,
    /// Replaces the mesh's own vertex colors before baking.
    pub surface_color: Option<[f32; 3]>,
    /// Indices into [`SceneDesc::lights`].
    pub lit_by: Vec<usize>,
    pub placement: Transform,
    pub motion: Motion,
}

impl ObjectDesc {
    pub fn new(name: impl Into<String>, source: MeshSource, placement: Transform) -> Self {
        Self {
            name: name.into(),
            source,
            texture: None,
            surface_color: None,
            lit_by: Vec::new(),
            placement,
            motion: Motion::Static,
        }
    }

    pub fn textured(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn colored(mut self, color: [f32; 3]) -> Self {
        self.surface_color = Some(color);
        self
    }

    pub fn lit_by(mut self, lights: impl IntoIterator<Item = usize>) -> Self {
        self.lit_by = lights.into_iter().collect();
        self
    }

    pub fn moving(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneDesc {
    pub lights: Vec<Light>,
    pub animators: Vec<LightAnimator>,
    pub objects: Vec<ObjectDesc>,
}

/// Mesh ready for upload. `unlit` is kept for objects that get re-baked.
#[derive(Clone, Debug)]
pub struct LoadedMesh {
    pub unlit: MeshData,
    pub lit: MeshData,
    pub texture: Option<TextureData>,
}

fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

impl SceneDesc {
    /// Spinning cubes, three OBJ pyramids with baked lights, a textured crate,
    /// a floor under a bouncing point light and a spot light, and a sky box.
    pub fn default_scene(assets: &Path) -> Result<Self> {
        let models = assets.join("models");
        let textures = assets.join("textures");
        let pyramid = models.join("pyramid.obj");
        let pyramid_color = lerp(BEIGE, PURPLE, 0.5);
        let spin = |axis| Motion::Spin {
            axis,
            degrees_per_second: CUBE_DEGREES_PER_SECOND,
        };

        let lights = vec![
            // 0: sun
            DirectionalLight::new(vec3(0.0, 1.0, -0.5), Vec3::splat(0.5)).into(),
            // 1: lamp above the pyramids
            PointLight::new(vec3(0.0, 1.0, 0.0), Vec3::splat(0.5), 1.0).into(),
            // 2: bouncing floor light
            PointLight::new(vec3(0.0, -0.5, 0.0), vec3(1.0, 0.9, 0.7), 1.5)
                .attenuated()
                .into(),
            // 3: floor spot
            SpotLight {
                position: vec3(0.0, 2.0, 2.0),
                color: vec3(0.3, 0.4, 1.0),
                cone_direction: vec3(0.0, -1.0, 0.0),
                cone_ratio: 0.85,
                inner_cone_ratio: 0.95,
                outer_cone_ratio: 0.85,
            }
            .into(),
        ];

        let animators = vec![LightAnimator::new(
            2,
            vec3(0.0, -0.5, 0.0),
            vec3(-3.0, -0.5, 0.0),
            vec3(3.0, -0.5, 0.0),
            vec3(1.5, 0.0, 0.0),
        )?];

        let objects = vec![
            ObjectDesc::new("cube", MeshSource::ColorCube, Transform::identity()).moving(spin(SpinAxis::Y)),
            ObjectDesc::new(
                "cube x-spin",
                MeshSource::ColorCube,
                Transform::from_translation(vec3(3.0, 0.0, 0.0)),
            )
            .moving(spin(SpinAxis::X)),
            ObjectDesc::new(
                "cube z-spin",
                MeshSource::ColorCube,
                Transform::from_translation(vec3(1.5, 1.0, 0.0)),
            )
            .moving(spin(SpinAxis::Z)),
            ObjectDesc::new(
                "pyramid (sun + lamp)",
                MeshSource::Obj(pyramid.clone()),
                Transform::from_translation(vec3(-1.5, 0.0, 0.0)),
            )
            .colored(pyramid_color)
            .lit_by([0, 1]),
            ObjectDesc::new(
                "pyramid (lamp)",
                MeshSource::Obj(pyramid.clone()),
                Transform::from_translation(vec3(-1.5, 1.0, 0.0)),
            )
            .colored(pyramid_color)
            .lit_by([1]),
            ObjectDesc::new(
                "pyramid (sun)",
                MeshSource::Obj(pyramid),
                Transform::from_translation(vec3(-1.5, 2.0, 0.0)),
            )
            .colored(pyramid_color)
            .lit_by([0]),
            ObjectDesc::new(
                "crate",
                MeshSource::Obj(models.join("crate.obj")),
                Transform::from_translation(vec3(-4.5, 0.0, 0.0)),
            )
            .textured(textures.join("crate.png")),
            ObjectDesc::new(
                "floor",
                MeshSource::FloorGrid { size: 12.0, cells: 48 },
                Transform::from_translation(vec3(0.0, -1.0, 0.0)),
            )
            .colored([0.8, 0.8, 0.8])
            .lit_by([2, 3]),
            ObjectDesc::new(
                "sky",
                MeshSource::SkyBox {
                    horizon: [0.55, 0.65, 0.8],
                    zenith: [0.1, 0.2, 0.45],
                },
                Transform::identity().with_scale(Vec3::splat(50.0)),
            )
            .moving(Motion::FollowCamera),
        ];

        let scene = Self {
            lights,
            animators,
            objects,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// Every light and animator reference must point at an existing light.
    pub fn validate(&self) -> CoreResult<()> {
        let count = self.lights.len();
        let referenced = self
            .objects
            .iter()
            .flat_map(|o| o.lit_by.iter().copied())
            .chain(self.animators.iter().map(|a| a.light));
        for index in referenced {
            if index >= count {
                return Err(CoreError::UnknownLight { index, count });
            }
        }
        Ok(())
    }

    pub fn lights_for(&self, mesh: MeshId) -> Vec<Light> {
        self.objects
            .get(mesh)
            .map(|o| o.lit_by.iter().filter_map(|&i| self.lights.get(i).copied()).collect())
            .unwrap_or_default()
    }

    /// Objects whose baked colors go stale when the animators move.
    pub fn dynamically_lit(&self) -> Vec<MeshId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.lit_by.iter().any(|l| self.animators.iter().any(|a| a.light == *l)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Advance every animator and write the results into the lights.
    /// Returns `true` if any light moved.
    pub fn animate_lights(&mut self, dt: f32) -> CoreResult<bool> {
        for animator in &mut self.animators {
            animator.drive(&mut self.lights, dt)?;
        }
        Ok(!self.animators.is_empty() && dt != 0.0)
    }

    /// Spawn one entity per object; entity order matches mesh ids.
    pub fn populate(&self, world: &mut World) -> Vec<Entity> {
        self.objects
            .iter()
            .enumerate()
            .map(|(mesh, o)| {
                world.spawn(
                    o.placement,
                    Some(Renderable {
                        mesh,
                        motion: o.motion,
                    }),
                )
            })
            .collect()
    }

    /// Start one background load per object.
    pub fn spawn_loads(&self) -> LoadSet<LoadedMesh> {
        let mut set = LoadSet::new();
        for (id, object) in self.objects.iter().enumerate() {
            let object = object.clone();
            let lights = self.lights_for(id);
            set.push(Pending::spawn(object.name.clone(), move || {
                load_object(&object, &lights)
            }));
        }
        log::info!("Queued {} scene resource loads", set.len());
        set
    }
}

/// Build the mesh for one object and bake its lights.
pub fn load_object(object: &ObjectDesc, lights: &[Light]) -> Result<LoadedMesh> {
    let mut mesh = match &object.source {
        MeshSource::ColorCube => primitives::color_cube(),
        MeshSource::FloorGrid { size, cells } => primitives::floor_grid(*size, *cells, [1.0; 3]),
        MeshSource::SkyBox { horizon, zenith } => primitives::sky_box(*horizon, *zenith),
        MeshSource::Obj(path) => obj::load_obj_from_path(path)
            .with_context(|| format!("Failed to load mesh for '{}'", object.name))?,
    };

    let texture = object.texture.as_ref().map(|path| {
        if matches!(object.source, MeshSource::Obj(_)) {
            mesh.flip_v();
        }
        TextureData::load_or_checkerboard(path)
    });

    if let Some(color) = object.surface_color {
        mesh.set_color(color);
    }

    let unlit = mesh.clone();
    lighting::bake(&mut mesh, lights, &object.placement);

    log::debug!(
        "Built '{}': {} vertices, {} triangles",
        object.name,
        mesh.vertices.len(),
        mesh.triangle_count()
    );

    Ok(LoadedMesh {
        unlit,
        lit: mesh,
        texture,
    })
}
