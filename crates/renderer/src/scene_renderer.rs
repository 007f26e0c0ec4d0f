//! Per-frame update and draw of the whole scene.
//!
//! Every object in the [`SceneDesc`] is one entity in the [`World`] and one
//! slot in `objects`; the slot stays empty until its background load has
//! finished and been uploaded. Nothing is drawn before the load barrier opens.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use asset::lighting;
use asset::loader::LoadSet;
use asset::mesh::MeshData;
use asset::scene::{LoadedMesh, SceneDesc};
use asset::texture::TextureData;
use corelib::camera::{Camera, DEFAULT_EYE, DEFAULT_TARGET};
use corelib::ecs::{MeshId, World};
use corelib::input::CameraInput;
use glam::Vec3;
use wgpu::{
    BindGroup, Buffer, BufferUsages, CommandEncoderDescriptor, LoadOp, Operations,
    RenderPassColorAttachment, RenderPassDescriptor, StoreOp, SurfaceError,
};
use winit::window::Window;

use crate::gpu::GpuState;
use crate::mesh::GpuMesh;
use crate::pipeline::{SceneUniform, ScenePipeline};
use crate::viewport::{self, Viewport};

#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub backends: wgpu::Backends,
    pub assets_dir: PathBuf,
    pub split_view: bool,
    /// Units per second.
    pub move_speed: f32,
    /// Radians per pixel per second.
    pub rot_speed: f32,
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            assets_dir: PathBuf::from("assets"),
            split_view: false,
            move_speed: 1.0,
            rot_speed: 0.75,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.08,
                a: 1.0,
            },
        }
    }
}

struct UniformSlot {
    buffer: Buffer,
    bind_group: BindGroup,
}

struct RenderObject {
    mesh: GpuMesh,
    /// One per viewport.
    uniforms: Vec<UniformSlot>,
    /// Kept only for meshes lit by an animated light.
    relight: Option<Relight>,
}

struct Relight {
    unlit: MeshData,
    lit: MeshData,
}

pub struct SceneRenderer {
    gpu: GpuState,
    pipeline: Option<ScenePipeline>,
    white: TextureData,
    config: RendererConfig,

    scene: SceneDesc,
    world: World,
    camera: Camera,
    input: CameraInput,
    viewports: Vec<Viewport>,

    loads: Option<LoadSet<LoadedMesh>>,
    objects: Vec<Option<RenderObject>>,
    dynamic: Vec<MeshId>,
    loads_completed: usize,
    loading_complete: bool,
}

impl SceneRenderer {
    pub async fn new(window: Arc<Window>, config: RendererConfig) -> Result<Self> {
        let gpu = GpuState::new(window, config.backends).await?;
        let scene = SceneDesc::default_scene(&config.assets_dir).context("Invalid scene description")?;
        let mut world = World::new();
        scene.populate(&mut world);
        let dynamic = scene.dynamically_lit();

        let (width, height) = gpu.size();
        let mut renderer = Self {
            gpu,
            pipeline: None,
            white: TextureData::white(),
            scene,
            world,
            camera: Camera::look_at(DEFAULT_EYE, DEFAULT_TARGET, Vec3::Y, 1.0),
            input: CameraInput::default(),
            viewports: Vec::new(),
            loads: None,
            objects: Vec::new(),
            dynamic,
            loads_completed: 0,
            loading_complete: false,
            config,
        };
        renderer.create_device_dependent_resources();
        renderer.create_window_size_dependent_resources(width, height);
        Ok(renderer)
    }

    /// Build the pipeline and start loading every scene mesh in the background.
    pub fn create_device_dependent_resources(&mut self) {
        self.pipeline = Some(ScenePipeline::new(&self.gpu.device, self.gpu.surface_format()));
        self.objects = (0..self.scene.objects.len()).map(|_| None).collect();
        self.loads = Some(self.scene.spawn_loads());
        self.loads_completed = 0;
        self.loading_complete = false;
    }

    /// Resize the surface and recompute viewports and projection.
    pub fn create_window_size_dependent_resources(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (width, height) = self.gpu.size();
        self.viewports = viewport::layout(width, height, self.config.split_view);
        if let Some(first) = self.viewports.first() {
            self.camera.aspect = first.aspect();
        }
        log::info!(
            "Output {}x{}, {} viewport(s), aspect {:.3}",
            width,
            height,
            self.viewports.len(),
            self.camera.aspect
        );
    }

    /// Drop every GPU resource; readiness resets until the next create call.
    pub fn release_device_dependent_resources(&mut self) {
        self.loading_complete = false;
        self.loads = None;
        self.objects.clear();
        self.pipeline = None;
    }

    pub fn set_input(&mut self, input: &CameraInput) {
        self.input = *input;
    }

    pub fn is_loading_complete(&self) -> bool {
        self.loading_complete
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Advance the scene by `dt` seconds; `total` is time since start.
    pub fn update(&mut self, dt: f32, total: f64) -> Result<()> {
        self.camera
            .update(dt, &self.input, self.config.move_speed, self.config.rot_speed);
        self.world.system_spin(total);
        self.world.system_follow_camera(self.camera.position());

        self.poll_loads();

        if self.scene.animate_lights(dt)? {
            self.relight();
        }
        Ok(())
    }

    fn poll_loads(&mut self) {
        let Some(pending) = self.loads.as_ref() else {
            return;
        };
        let completed = pending.completed();
        if completed != self.loads_completed {
            self.loads_completed = completed;
            log::debug!("Loaded {}/{} scene resources", completed, pending.len());
        }
        if completed < pending.len() {
            return;
        }
        let Some(loads) = self.loads.take() else {
            return;
        };

        let mut uploaded = 0;
        let total = loads.len();
        for (mesh_id, (label, result)) in loads.finish().into_iter().enumerate() {
            match result {
                Ok(loaded) => {
                    if let Some(object) = self.upload(mesh_id, &label, loaded) {
                        self.objects[mesh_id] = Some(object);
                        uploaded += 1;
                    }
                }
                Err(err) => log::error!("Skipping '{}': {:#}", label, err),
            }
        }
        self.loading_complete = true;
        log::info!("Scene ready: {}/{} meshes uploaded", uploaded, total);
    }

    fn upload(&self, mesh_id: MeshId, label: &str, loaded: LoadedMesh) -> Option<RenderObject> {
        let pipeline = self.pipeline.as_ref()?;
        let device = &self.gpu.device;
        let texture = loaded
            .texture
            .as_ref()
            .filter(|t| t.is_valid())
            .unwrap_or(&self.white);
        let mesh = GpuMesh::upload(
            device,
            &self.gpu.queue,
            label,
            &loaded.lit,
            texture,
            &pipeline.texture_bgl,
            &pipeline.sampler,
        );

        let uniforms = (0..self.viewports.len())
            .map(|i| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{label} UBO {i}")),
                    size: std::mem::size_of::<SceneUniform>() as u64,
                    usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{label} UBO BG {i}")),
                    layout: &pipeline.uniform_bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                UniformSlot { buffer, bind_group }
            })
            .collect();

        let relight = self.dynamic.contains(&mesh_id).then(|| Relight {
            unlit: loaded.unlit,
            lit: loaded.lit,
        });

        log::debug!("Uploaded '{}' ({} indices)", label, mesh.index_count);
        Some(RenderObject {
            mesh,
            uniforms,
            relight,
        })
    }

    /// Re-bake meshes lit by animated lights and rewrite their vertex buffers.
    fn relight(&mut self) {
        for &mesh_id in &self.dynamic {
            let Some(Some(object)) = self.objects.get_mut(mesh_id) else {
                continue;
            };
            let Some(relight) = object.relight.as_mut() else {
                continue;
            };
            let Some(desc) = self.scene.objects.get(mesh_id) else {
                continue;
            };
            let lights = self.scene.lights_for(mesh_id);
            lighting::bake_into(&relight.unlit.vertices, &mut relight.lit.vertices, &lights, &desc.placement);
            object.mesh.write_vertices(&self.gpu.queue, &relight.lit);
        }
    }

    /// Render one frame into every viewport.
    pub fn render(&mut self) -> Result<(), SurfaceError> {
        let frame = self.gpu.acquire_frame()?;
        let target = frame.texture.create_view(&Default::default());

        if self.loading_complete {
            self.write_uniforms();
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.config.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let (true, Some(pipeline)) = (self.loading_complete, self.pipeline.as_ref()) {
                rpass.set_pipeline(&pipeline.pipeline);
                for (slot, vp) in self.viewports.iter().enumerate() {
                    rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
                    for (_, _, renderable) in self.world.iter_renderables() {
                        let Some(Some(object)) = self.objects.get(renderable.mesh) else {
                            continue;
                        };
                        let Some(uniform) = object.uniforms.get(slot) else {
                            continue;
                        };
                        rpass.set_bind_group(0, &uniform.bind_group, &[]);
                        rpass.set_bind_group(1, &object.mesh.texture_bg, &[]);
                        rpass.set_vertex_buffer(0, object.mesh.vertex_buf.slice(..));
                        rpass.set_index_buffer(object.mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..object.mesh.index_count, 0, 0..1);
                    }
                }
            }
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn write_uniforms(&self) {
        let view = self.camera.view();
        for (slot, vp) in self.viewports.iter().enumerate() {
            let projection = self.camera.with_aspect(vp.aspect()).proj();
            let view = view * vp.view_offset;
            for (_, transform, renderable) in self.world.iter_renderables() {
                let Some(Some(object)) = self.objects.get(renderable.mesh) else {
                    continue;
                };
                let Some(uniform) = object.uniforms.get(slot) else {
                    continue;
                };
                let data = SceneUniform::new(transform.matrix(), view, projection);
                self.gpu
                    .queue
                    .write_buffer(&uniform.buffer, 0, bytemuck::bytes_of(&data));
            }
        }
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        GpuState::is_surface_lost(err)
    }

    pub fn recreate_surface(&mut self) {
        self.gpu.recreate_surface();
    }
}
