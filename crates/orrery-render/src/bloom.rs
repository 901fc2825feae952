//! Bloom post-processing: extract bright pixels, blur at half resolution,
//! then composite back over the scene with tonemapping.
//!
//! Sits between the HDR scene pass and the FXAA pass. When bloom is
//! disabled the composite still runs so tonemapping always happens.

use bytemuck::{Pod, Zeroable};

/// Bloom parameters, mirrored into the shader uniform.
#[derive(Clone, Copy, Debug)]
pub struct BloomParams {
    /// Luminance threshold above which pixels bloom.
    pub threshold: f32,
    /// Intensity of the blurred glow added back onto the frame.
    pub strength: f32,
    /// Blur tap spacing multiplier.
    pub radius: f32,
    /// Whether the glow is added at all.
    pub enabled: bool,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            strength: 0.5,
            radius: 0.5,
            enabled: true,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BloomUniform {
    threshold: f32,
    strength: f32,
    radius: f32,
    enabled: f32,
}

impl From<BloomParams> for BloomUniform {
    fn from(params: BloomParams) -> Self {
        Self {
            threshold: params.threshold,
            strength: params.strength,
            radius: params.radius,
            enabled: if params.enabled { 1.0 } else { 0.0 },
        }
    }
}

pub const BLOOM_SHADER_SOURCE: &str = r#"
struct BloomUniform {
    threshold: f32,
    strength: f32,
    radius: f32,
    enabled: f32,
};

@group(0) @binding(0) var<uniform> params: BloomUniform;
@group(1) @binding(0) var input_tex: texture_2d<f32>;
@group(1) @binding(1) var input_sampler: sampler;
@group(2) @binding(0) var glow_tex: texture_2d<f32>;
@group(2) @binding(1) var glow_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_extract(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(input_tex, input_sampler, in.uv).rgb;
    let luminance = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    if (luminance <= params.threshold) {
        return vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }
    return vec4<f32>(color * (luminance - params.threshold) / max(luminance, 0.0001), 1.0);
}

fn blur(uv: vec2<f32>, step: vec2<f32>) -> vec3<f32> {
    // 9-tap Gaussian.
    var weights = array<f32, 5>(0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216);
    var color = textureSample(input_tex, input_sampler, uv).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let offset = step * f32(i) * params.radius * 2.0;
        color = color + textureSample(input_tex, input_sampler, uv + offset).rgb * weights[i];
        color = color + textureSample(input_tex, input_sampler, uv - offset).rgb * weights[i];
    }
    return color;
}

@fragment
fn fs_blur_horizontal(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / vec2<f32>(textureDimensions(input_tex));
    return vec4<f32>(blur(in.uv, vec2<f32>(texel.x, 0.0)), 1.0);
}

@fragment
fn fs_blur_vertical(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / vec2<f32>(textureDimensions(input_tex));
    return vec4<f32>(blur(in.uv, vec2<f32>(0.0, texel.y)), 1.0);
}

fn aces_tonemap(hdr: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((hdr * (a * hdr + b)) / (hdr * (c * hdr + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    let scene = textureSample(input_tex, input_sampler, in.uv).rgb;
    let glow = textureSample(glow_tex, glow_sampler, in.uv).rgb;
    // enabled is 0 or 1; with bloom off the glow target is untouched
    // (zero-initialized) and contributes nothing either way.
    let color = scene + glow * params.strength * params.enabled;
    return vec4<f32>(aces_tonemap(color), 1.0);
}
"#;

/// The bloom pass chain and its render targets.
pub struct BloomPipeline {
    params: BloomParams,
    extract_pipeline: wgpu::RenderPipeline,
    blur_h_pipeline: wgpu::RenderPipeline,
    blur_v_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    hdr_format: wgpu::TextureFormat,
    // Half-resolution ping-pong targets.
    ping_view: wgpu::TextureView,
    ping_bind_group: wgpu::BindGroup,
    pong_view: wgpu::TextureView,
    pong_bind_group: wgpu::BindGroup,
}

impl BloomPipeline {
    /// `output_format` is the format of the tonemapped target the composite
    /// writes to (the FXAA input).
    pub fn new(
        device: &wgpu::Device,
        hdr_format: wgpu::TextureFormat,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        params: BloomParams,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom-shader"),
            source: wgpu::ShaderSource::Wgsl(BLOOM_SHADER_SOURCE.into()),
        });

        let params_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-params-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(16),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bloom-pipeline-layout"),
            bind_group_layouts: &[&params_bgl, &texture_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let make_pipeline = |entry: &str, format: wgpu::TextureFormat, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_fullscreen"),
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
                    entry_point: Some(entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };

        let extract_pipeline = make_pipeline("fs_extract", hdr_format, "bloom-extract");
        let blur_h_pipeline = make_pipeline("fs_blur_horizontal", hdr_format, "bloom-blur-h");
        let blur_v_pipeline = make_pipeline("fs_blur_vertical", hdr_format, "bloom-blur-v");
        let composite_pipeline = make_pipeline("fs_composite", output_format, "bloom-composite");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        use wgpu::util::DeviceExt;
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom-params"),
            contents: bytemuck::cast_slice(&[BloomUniform::from(params)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom-params-bg"),
            layout: &params_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let (ping_view, ping_bind_group) =
            half_res_target(device, &texture_bgl, &sampler, hdr_format, width, height, "ping");
        let (pong_view, pong_bind_group) =
            half_res_target(device, &texture_bgl, &sampler, hdr_format, width, height, "pong");

        Self {
            params,
            extract_pipeline,
            blur_h_pipeline,
            blur_v_pipeline,
            composite_pipeline,
            params_buffer,
            params_bind_group,
            texture_bgl,
            sampler,
            hdr_format,
            ping_view,
            ping_bind_group,
            pong_view,
            pong_bind_group,
        }
    }

    /// Bind group layout for sampled inputs (shared with the scene HDR view
    /// and the composite output).
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_bgl
    }

    /// Sampler used for all fullscreen passes.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Recreate the half-resolution targets for a new viewport size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (ping_view, ping_bind_group) = half_res_target(
            device,
            &self.texture_bgl,
            &self.sampler,
            self.hdr_format,
            width,
            height,
            "ping",
        );
        let (pong_view, pong_bind_group) = half_res_target(
            device,
            &self.texture_bgl,
            &self.sampler,
            self.hdr_format,
            width,
            height,
            "pong",
        );
        self.ping_view = ping_view;
        self.ping_bind_group = ping_bind_group;
        self.pong_view = pong_view;
        self.pong_bind_group = pong_bind_group;
    }

    /// Update parameters (e.g. after a config change).
    pub fn set_params(&mut self, queue: &wgpu::Queue, params: BloomParams) {
        self.params = params;
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::cast_slice(&[BloomUniform::from(params)]),
        );
    }

    /// Record the bloom chain: extract + blur from `scene_bind_group` (the
    /// HDR scene view), then composite tonemapped output into `output`.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene_bind_group: &wgpu::BindGroup,
        output: &wgpu::TextureView,
    ) {
        if self.params.enabled {
            self.fullscreen_pass(
                encoder,
                "bloom-extract",
                &self.extract_pipeline,
                scene_bind_group,
                scene_bind_group,
                &self.ping_view,
            );
            self.fullscreen_pass(
                encoder,
                "bloom-blur-h",
                &self.blur_h_pipeline,
                &self.ping_bind_group,
                &self.ping_bind_group,
                &self.pong_view,
            );
            self.fullscreen_pass(
                encoder,
                "bloom-blur-v",
                &self.blur_v_pipeline,
                &self.pong_bind_group,
                &self.pong_bind_group,
                &self.ping_view,
            );
        }
        // Composite always runs so tonemapping happens even with bloom off.
        self.fullscreen_pass(
            encoder,
            "bloom-composite",
            &self.composite_pipeline,
            scene_bind_group,
            &self.ping_bind_group,
            output,
        );
    }

    fn fullscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        input: &wgpu::BindGroup,
        glow: &wgpu::BindGroup,
        target: &wgpu::TextureView,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
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
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.params_bind_group, &[]);
        pass.set_bind_group(1, input, &[]);
        pass.set_bind_group(2, glow, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn half_res_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    label: &str,
) -> (wgpu::TextureView, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: (width / 2).max(1),
            height: (height / 2).max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
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
    (view, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_documented_scene() {
        let params = BloomParams::default();
        assert_eq!(params.threshold, 0.5);
        assert_eq!(params.strength, 0.5);
        assert_eq!(params.radius, 0.5);
        assert!(params.enabled);
    }

    #[test]
    fn test_uniform_encodes_enabled_flag() {
        let mut params = BloomParams::default();
        let uniform = BloomUniform::from(params);
        assert_eq!(uniform.enabled, 1.0);
        params.enabled = false;
        assert_eq!(BloomUniform::from(params).enabled, 0.0);
    }
}
