//! GPU-side meshes: vertex layout, buffers and the per-mesh texture binding.

use asset::mesh::{MeshData, MeshVertex};
use asset::texture::TextureData;
use bytemuck::{Pod, Zeroable};
use wgpu::{
    util::{DeviceExt, TextureDataOrder},
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Extent3d, Queue, Sampler,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, VertexBufferLayout,
    VertexStepMode,
};

/// Vertex: position + baked color + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

impl From<&MeshVertex> for Vertex {
    fn from(v: &MeshVertex) -> Self {
        Self {
            pos: v.position,
            color: v.color,
            uv: v.uv,
        }
    }
}

pub fn to_vertices(mesh: &MeshData) -> Vec<Vertex> {
    mesh.vertices.iter().map(Vertex::from).collect()
}

pub struct GpuMesh {
    pub vertex_buf: Buffer,
    pub index_buf: Buffer,
    pub index_count: u32,
    pub texture_bg: BindGroup,
}

impl GpuMesh {
    pub fn upload(
        device: &Device,
        queue: &Queue,
        label: &str,
        mesh: &MeshData,
        texture: &TextureData,
        texture_bgl: &BindGroupLayout,
        sampler: &Sampler,
    ) -> Self {
        let vertices = to_vertices(mesh);
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });

        let tex = device.create_texture_with_data(
            queue,
            &TextureDescriptor {
                label: Some(&format!("{label} Texture")),
                size: Extent3d {
                    width: texture.width,
                    height: texture.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: TextureDimension::D2,
                format: TextureFormat::Rgba8UnormSrgb,
                usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            &texture.data,
        );
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let texture_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Texture BG")),
            layout: texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
            texture_bg,
        }
    }

    /// Rewrite vertex colors after a re-bake. Vertex count must not change.
    pub fn write_vertices(&self, queue: &Queue, mesh: &MeshData) {
        let vertices = to_vertices(mesh);
        queue.write_buffer(&self.vertex_buf, 0, bytemuck::cast_slice(&vertices));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::LAYOUT.array_stride, 32);
    }

    #[test]
    fn conversion_keeps_baked_color() {
        let mv = MeshVertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.25, 0.5]).with_color([0.1, 0.2, 0.3]);
        let v = Vertex::from(&mv);
        assert_eq!(v.pos, [1.0, 2.0, 3.0]);
        assert_eq!(v.color, [0.1, 0.2, 0.3]);
        assert_eq!(v.uv, [0.25, 0.5]);
    }
}
