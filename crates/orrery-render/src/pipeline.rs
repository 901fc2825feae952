//! Lit, textured scene pipeline for spheres and rings.
//!
//! Renders into the HDR target. Lighting is ambient plus one point light;
//! the sun is drawn emissive so its texture drives the bloom pass. Culling
//! is disabled so ring annuli are visible from both faces.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-frame uniform: camera and lighting (group 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz camera position, w unused.
    pub camera_position: [f32; 4],
    /// xyz light world position, w intensity.
    pub light_position: [f32; 4],
    /// x range, y decay, zw unused.
    pub light_params: [f32; 4],
    /// rgb ambient color, w intensity.
    pub ambient: [f32; 4],
}

impl FrameUniform {
    pub fn new(
        view_proj: Mat4,
        camera_position: glam::Vec3,
        light_position: glam::Vec3,
        light_intensity: f32,
        light_range: f32,
        light_decay: f32,
        ambient_color: [f32; 3],
        ambient_intensity: f32,
    ) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.extend(0.0).to_array(),
            light_position: light_position.extend(light_intensity).to_array(),
            light_params: [light_range, light_decay, 0.0, 0.0],
            ambient: [
                ambient_color[0],
                ambient_color[1],
                ambient_color[2],
                ambient_intensity,
            ],
        }
    }
}

/// Per-draw uniform: model transform and material flags (group 2).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    /// x emissive strength (0 for lit surfaces), yzw unused.
    pub material: [f32; 4],
}

impl ModelUniform {
    /// A lit surface shaded by the scene lights.
    pub fn lit(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            material: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// An emissive surface (the sun): unlit, scaled above 1.0 to feed bloom.
    pub fn emissive(model: Mat4, strength: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            material: [strength, 0.0, 0.0, 0.0],
        }
    }
}

/// WGSL for the scene pass.
pub const SCENE_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_position: vec4<f32>,
    light_params: vec4<f32>,
    ambient: vec4<f32>,
};

struct ModelUniform {
    model: mat4x4<f32>,
    material: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: FrameUniform;
@group(1) @binding(0) var t_surface: texture_2d<f32>;
@group(1) @binding(1) var s_surface: sampler;
@group(2) @binding(0) var<uniform> object: ModelUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = object.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    // Rotation-and-translation-only models: the upper 3x3 rotates normals.
    out.world_normal = normalize((object.model * vec4<f32>(in.normal, 0.0)).xyz);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(t_surface, s_surface, in.uv).rgb;

    let emissive = object.material.x;
    if (emissive > 0.0) {
        return vec4<f32>(base * emissive, 1.0);
    }

    // Double-sided shading: flip the normal on back faces.
    let to_camera = normalize(frame.camera_position.xyz - in.world_position);
    var normal = in.world_normal;
    if (dot(normal, to_camera) < 0.0) {
        normal = -normal;
    }

    let to_light = frame.light_position.xyz - in.world_position;
    let distance = max(length(to_light), 0.001);
    let direction = to_light / distance;

    let intensity = frame.light_position.w;
    let range = frame.light_params.x;
    let decay = frame.light_params.y;

    let attenuation = intensity / pow(distance, decay) * clamp(1.0 - distance / range, 0.0, 1.0);
    let diffuse = max(dot(normal, direction), 0.0) * attenuation;
    // Ambient color and intensity come through the uniform as documented.
    let ambient = frame.ambient.rgb * frame.ambient.w;

    let lit = base * (ambient + diffuse);
    return vec4<f32>(lit, 1.0);
}
"#;

/// The scene render pipeline and its bind group layouts.
pub struct ScenePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl ScenePipeline {
    /// Create the pipeline. `texture_bind_group_layout` is group 1.
    pub fn new(
        device: &wgpu::Device,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
        hdr_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene-shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER_SOURCE.into()),
        });

        let frame_bind_group_layout = uniform_layout(
            device,
            "scene-frame-bgl",
            std::mem::size_of::<FrameUniform>() as u64,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let model_bind_group_layout = uniform_layout(
            device,
            "scene-model-bgl",
            std::mem::size_of::<ModelUniform>() as u64,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene-pipeline-layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                texture_bind_group_layout,
                &model_bind_group_layout,
            ],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[crate::mesh::Vertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // ring annuli must be visible from both faces
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
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
            frame_bind_group_layout,
            model_bind_group_layout,
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    min_size: u64,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(min_size),
            },
            count: None,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_frame_uniform_packs_light() {
        let uniform = FrameUniform::new(
            Mat4::IDENTITY,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::ZERO,
            5000.0,
            5000.0,
            1.75,
            [0.2, 0.2, 0.2],
            1.0,
        );
        assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(uniform.light_position[3], 5000.0);
        assert_eq!(uniform.light_params[0], 5000.0);
        assert_eq!(uniform.light_params[1], 1.75);
    }

    #[test]
    fn test_ambient_reaches_shader_unscaled() {
        // The documented ambient color and intensity go through the uniform
        // verbatim; the shader applies no additional scale factor.
        let uniform = FrameUniform::new(
            Mat4::IDENTITY,
            Vec3::ZERO,
            Vec3::ZERO,
            5000.0,
            5000.0,
            1.75,
            [0.2, 0.2, 0.2],
            1.0,
        );
        assert_eq!(uniform.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert!(SCENE_SHADER_SOURCE.contains("frame.ambient.rgb * frame.ambient.w"));
        assert!(!SCENE_SHADER_SOURCE.contains("ambient * 0."));
    }

    #[test]
    fn test_model_uniform_material_flags() {
        let lit = ModelUniform::lit(Mat4::IDENTITY);
        assert_eq!(lit.material[0], 0.0);
        let emissive = ModelUniform::emissive(Mat4::IDENTITY, 2.0);
        assert_eq!(emissive.material[0], 2.0);
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniform>() % 16, 0);
    }
}
