//! Starfield background pass.
//!
//! A fullscreen triangle that reconstructs the view direction per pixel and
//! samples the star texture equirectangularly, so the backdrop rotates with
//! the camera but never translates. Drawn first into the HDR target with
//! depth writes off.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Asset name of the star background texture.
pub const STARS_TEXTURE: &str = "stars.jpg";

/// Per-frame uniform for the skybox: the inverse view-projection with the
/// camera translation removed.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyUniform {
    pub inv_rotation_proj: [[f32; 4]; 4],
}

impl SkyUniform {
    /// Build from the camera's projection and view matrices. Only the view's
    /// rotation is kept, so the sky stays at infinity.
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        let mut rotation_only = view;
        rotation_only.w_axis = glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        Self {
            inv_rotation_proj: (projection * rotation_only).inverse().to_cols_array_2d(),
        }
    }
}

pub const SKYBOX_SHADER_SOURCE: &str = r#"
struct SkyUniform {
    inv_rotation_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> sky: SkyUniform;
@group(1) @binding(0) var t_stars: texture_2d<f32>;
@group(1) @binding(1) var s_stars: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 1.0, 1.0);
    out.ndc = uv * 2.0 - 1.0;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let far_point = sky.inv_rotation_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let direction = normalize(far_point.xyz / far_point.w);

    // Equirectangular lookup.
    let u = atan2(direction.z, direction.x) / 6.2831853 + 0.5;
    let v = 0.5 - asin(clamp(direction.y, -1.0, 1.0)) / 3.1415927;
    return vec4<f32>(textureSample(t_stars, s_stars, vec2<f32>(u, v)).rgb, 1.0);
}
"#;

/// Pipeline for the starfield background.
pub struct SkyboxPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub sky_bind_group_layout: wgpu::BindGroupLayout,
}

impl SkyboxPipeline {
    pub fn new(
        device: &wgpu::Device,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
        hdr_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox-shader"),
            source: wgpu::ShaderSource::Wgsl(SKYBOX_SHADER_SOURCE.into()),
        });

        let sky_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("skybox-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<SkyUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox-pipeline-layout"),
            bind_group_layouts: &[&sky_bind_group_layout, texture_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                // The sky is behind everything; never write depth.
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: hdr_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            sky_bind_group_layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_sky_uniform_strips_translation() {
        let view = Mat4::look_at_rh(Vec3::new(100.0, 50.0, 25.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, 1.6, 0.1, 1000.0);
        let uniform = SkyUniform::new(projection, view);

        // Center-of-screen far point should unproject to the view direction,
        // independent of where the camera sits.
        let inv = Mat4::from_cols_array_2d(&uniform.inv_rotation_proj);
        let far = inv * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let direction = (far.truncate() / far.w).normalize();
        let expected = (Vec3::ZERO - Vec3::new(100.0, 50.0, 25.0)).normalize();
        assert!((direction - expected).length() < 1e-3);
    }
}
