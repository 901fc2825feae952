//! FXAA anti-aliasing pass.
//!
//! Final fullscreen pass: reads the tonemapped frame and writes the
//! smoothed result to the swapchain. Luma-based edge detection with a
//! short directional blend, enough to soften sphere silhouettes and ring
//! edges without any geometry-side multisampling.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct FxaaUniform {
    /// 1 / viewport size in pixels, zw unused.
    texel_size: [f32; 4],
}

pub const FXAA_SHADER_SOURCE: &str = r#"
struct FxaaUniform {
    texel_size: vec4<f32>,
};

@group(0) @binding(0) var<uniform> fxaa: FxaaUniform;
@group(1) @binding(0) var frame_tex: texture_2d<f32>;
@group(1) @binding(1) var frame_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

fn luma(color: vec3<f32>) -> f32 {
    return dot(color, vec3<f32>(0.299, 0.587, 0.114));
}

const EDGE_THRESHOLD_MIN: f32 = 0.0312;
const EDGE_THRESHOLD: f32 = 0.125;
const SPAN_MAX: f32 = 8.0;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = fxaa.texel_size.xy;

    let center = textureSample(frame_tex, frame_sampler, in.uv).rgb;
    let nw = textureSample(frame_tex, frame_sampler, in.uv + vec2<f32>(-1.0, -1.0) * texel).rgb;
    let ne = textureSample(frame_tex, frame_sampler, in.uv + vec2<f32>(1.0, -1.0) * texel).rgb;
    let sw = textureSample(frame_tex, frame_sampler, in.uv + vec2<f32>(-1.0, 1.0) * texel).rgb;
    let se = textureSample(frame_tex, frame_sampler, in.uv + vec2<f32>(1.0, 1.0) * texel).rgb;

    let luma_center = luma(center);
    let luma_nw = luma(nw);
    let luma_ne = luma(ne);
    let luma_sw = luma(sw);
    let luma_se = luma(se);

    let luma_min = min(luma_center, min(min(luma_nw, luma_ne), min(luma_sw, luma_se)));
    let luma_max = max(luma_center, max(max(luma_nw, luma_ne), max(luma_sw, luma_se)));
    let contrast = luma_max - luma_min;

    var dir = vec2<f32>(
        -((luma_nw + luma_ne) - (luma_sw + luma_se)),
        ((luma_nw + luma_sw) - (luma_ne + luma_se)),
    );
    let dir_reduce = max((luma_nw + luma_ne + luma_sw + luma_se) * 0.03125, 0.0078125);
    let rcp_dir_min = 1.0 / (min(abs(dir.x), abs(dir.y)) + dir_reduce);
    dir = clamp(dir * rcp_dir_min, vec2<f32>(-SPAN_MAX), vec2<f32>(SPAN_MAX)) * texel;

    let sample_a = 0.5 * (
        textureSample(frame_tex, frame_sampler, in.uv + dir * (1.0 / 3.0 - 0.5)).rgb
        + textureSample(frame_tex, frame_sampler, in.uv + dir * (2.0 / 3.0 - 0.5)).rgb
    );
    let sample_b = sample_a * 0.5 + 0.25 * (
        textureSample(frame_tex, frame_sampler, in.uv + dir * -0.5).rgb
        + textureSample(frame_tex, frame_sampler, in.uv + dir * 0.5).rgb
    );

    // All samples happen in uniform control flow; pick the result at the end.
    if (contrast < max(EDGE_THRESHOLD_MIN, luma_max * EDGE_THRESHOLD)) {
        return vec4<f32>(center, 1.0);
    }
    let luma_b = luma(sample_b);
    if (luma_b < luma_min || luma_b > luma_max) {
        return vec4<f32>(sample_a, 1.0);
    }
    return vec4<f32>(sample_b, 1.0);
}
"#;

/// Fullscreen FXAA pipeline writing to the surface format.
pub struct FxaaPipeline {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl FxaaPipeline {
    /// `texture_bgl` is the shared fullscreen texture+sampler layout;
    /// `surface_format` is the swapchain format this pass writes to.
    pub fn new(
        device: &wgpu::Device,
        texture_bgl: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fxaa-shader"),
            source: wgpu::ShaderSource::Wgsl(FXAA_SHADER_SOURCE.into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fxaa-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(
                        std::mem::size_of::<FxaaUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fxaa-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, texture_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fxaa-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        use wgpu::util::DeviceExt;
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fxaa-uniform"),
            contents: bytemuck::cast_slice(&[texel_uniform(width, height)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fxaa-uniform-bg"),
            layout: &uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
        }
    }

    /// Update the texel size after a viewport resize.
    pub fn resize(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[texel_uniform(width, height)]),
        );
    }

    /// Record the pass: read `input` (the tonemapped frame), write `target`
    /// (the swapchain view).
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::BindGroup,
        target: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fxaa"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, input, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn texel_uniform(width: u32, height: u32) -> FxaaUniform {
    FxaaUniform {
        texel_size: [
            1.0 / width.max(1) as f32,
            1.0 / height.max(1) as f32,
            0.0,
            0.0,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_size_matches_viewport() {
        let uniform = texel_uniform(1280, 720);
        assert!((uniform.texel_size[0] - 1.0 / 1280.0).abs() < 1e-9);
        assert!((uniform.texel_size[1] - 1.0 / 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_texel_size_clamps_zero_dimensions() {
        let uniform = texel_uniform(0, 0);
        assert_eq!(uniform.texel_size[0], 1.0);
        assert_eq!(uniform.texel_size[1], 1.0);
    }
}
