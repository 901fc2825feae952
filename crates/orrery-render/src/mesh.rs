//! CPU-side geometry for spheres and ring annuli, plus GPU upload.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::TAU;

/// Longitude/latitude segment count used for every sphere and ring.
pub const SEGMENTS: u32 = 32;

/// Vertex with position, normal, and UV, matching the scene pipeline layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex buffer layout for the scene pipeline.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 24,
                shader_location: 2,
            },
        ],
    };
}

/// A mesh ready for upload.
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Vertex and index buffers resident on the GPU.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    /// Upload vertices and indices to GPU buffers.
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        use wgpu::util::DeviceExt;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

impl GpuMesh {
    /// Bind buffers and draw the whole mesh.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Generate a UV sphere of the given radius with equirectangular UVs.
///
/// Latitude rings run pole to pole; `v` goes from 0 at the north pole to 1
/// at the south pole, `u` wraps once around the equator.
pub fn generate_uv_sphere(radius: f32) -> Mesh {
    let rings = SEGMENTS;
    let segments = SEGMENTS;

    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let polar = v * std::f32::consts::PI;
        let (sin_polar, cos_polar) = polar.sin_cos();

        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let azimuth = u * TAU;
            let (sin_azimuth, cos_azimuth) = azimuth.sin_cos();

            let normal = Vec3::new(sin_polar * cos_azimuth, cos_polar, sin_polar * sin_azimuth);
            vertices.push(Vertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
                uv: [u, v],
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    Mesh { vertices, indices }
}

/// Generate a flat annulus in the XY plane spanning `[inner_radius,
/// outer_radius]`, normal +Z.
///
/// Radii are taken as given; a degenerate or inverted span produces the
/// matching degenerate geometry rather than an error. UVs are planar over
/// the outer disk. The pipeline renders it without backface culling, so one
/// sided geometry is visible from both faces.
pub fn generate_annulus(inner_radius: f32, outer_radius: f32) -> Mesh {
    let segments = SEGMENTS;

    let mut vertices = Vec::with_capacity((2 * (segments + 1)) as usize);
    for segment in 0..=segments {
        let angle = segment as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();

        for &radius in &[inner_radius, outer_radius] {
            let x = cos * radius;
            let y = sin * radius;
            vertices.push(Vertex {
                position: [x, y, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [
                    (x / outer_radius + 1.0) * 0.5,
                    (y / outer_radius + 1.0) * 0.5,
                ],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * 6) as usize);
    for segment in 0..segments {
        let inner = segment * 2;
        let outer = inner + 1;
        let next_inner = inner + 2;
        let next_outer = inner + 3;
        indices.extend_from_slice(&[inner, outer, next_inner, next_inner, outer, next_outer]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = generate_uv_sphere(6.0);
        for vertex in &mesh.vertices {
            let length = Vec3::from_array(vertex.position).length();
            assert!(
                (length - 6.0).abs() < 1e-4,
                "vertex off the sphere: length = {length}"
            );
        }
    }

    #[test]
    fn test_sphere_normals_unit_and_radial() {
        let mesh = generate_uv_sphere(3.2);
        for vertex in &mesh.vertices {
            let normal = Vec3::from_array(vertex.normal);
            assert!((normal.length() - 1.0).abs() < 1e-5);
            let radial = Vec3::from_array(vertex.position) / 3.2;
            assert!((normal - radial).length() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_indices_valid() {
        let mesh = generate_uv_sphere(1.0);
        let count = mesh.vertices.len() as u32;
        assert_eq!(mesh.indices.len() % 3, 0);
        for &index in &mesh.indices {
            assert!(index < count);
        }
    }

    #[test]
    fn test_sphere_uvs_in_range() {
        let mesh = generate_uv_sphere(1.0);
        for vertex in &mesh.vertices {
            assert!((0.0..=1.0).contains(&vertex.uv[0]));
            assert!((0.0..=1.0).contains(&vertex.uv[1]));
        }
    }

    #[test]
    fn test_annulus_radii_bound_vertices() {
        let mesh = generate_annulus(10.0, 20.0);
        for vertex in &mesh.vertices {
            let radial = (vertex.position[0].powi(2) + vertex.position[1].powi(2)).sqrt();
            assert!((9.999..=20.001).contains(&radial), "radial = {radial}");
            assert_eq!(vertex.position[2], 0.0);
        }
    }

    #[test]
    fn test_annulus_is_flat_with_z_normal() {
        let mesh = generate_annulus(7.0, 12.0);
        for vertex in &mesh.vertices {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_annulus_indices_valid() {
        let mesh = generate_annulus(1.0, 2.0);
        let count = mesh.vertices.len() as u32;
        assert_eq!(mesh.indices.len() as u32, SEGMENTS * 6);
        for &index in &mesh.indices {
            assert!(index < count);
        }
    }

    #[test]
    fn test_degenerate_annulus_not_rejected() {
        // Inverted radii are the descriptor author's problem; the generator
        // must still produce structurally valid geometry.
        let mesh = generate_annulus(5.0, 3.0);
        assert!(!mesh.vertices.is_empty());
        let count = mesh.vertices.len() as u32;
        for &index in &mesh.indices {
            assert!(index < count);
        }
    }
}
