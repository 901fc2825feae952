//! Per-frame orchestration: scene graph to presented frame.
//!
//! The renderer walks the scene graph each frame, lazily building GPU
//! resources for geometry nodes, then composites skybox + lit scene into an
//! HDR target, runs bloom and tonemapping, and finishes with FXAA into the
//! swapchain.

use std::collections::HashMap;
use std::path::PathBuf;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use orrery_animation::FrameSink;
use orrery_scene::{Node, NodeId, NodeKind, SceneGraph};
use orrery_system::{
    AMBIENT_LIGHT_COLOR, AMBIENT_LIGHT_INTENSITY, SUN_LIGHT_DECAY, SUN_LIGHT_INTENSITY,
    SUN_LIGHT_RANGE,
};

use crate::bloom::{BloomParams, BloomPipeline};
use crate::camera::OrbitCamera;
use crate::fxaa::FxaaPipeline;
use crate::gpu::{GpuContext, GpuError};
use crate::mesh::{generate_annulus, generate_uv_sphere, GpuMesh};
use crate::pipeline::{FrameUniform, ModelUniform, ScenePipeline};
use crate::skybox::{SkyUniform, SkyboxPipeline, STARS_TEXTURE};
use crate::texture::{BoundTexture, TextureLibrary};

/// Intermediate scene target format, wide enough for over-bright emissives.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Depth buffer format for the scene pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Tonemapped target format between bloom composite and FXAA.
pub const POST_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Emissive multiplier for the sun's surface, above 1.0 so it crosses the
/// bloom threshold.
const SUN_EMISSIVE_STRENGTH: f32 = 2.0;

/// GPU resources for one geometry node.
struct Drawable {
    mesh: GpuMesh,
    texture: std::sync::Arc<BoundTexture>,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    emissive: f32,
}

/// A render-attachment texture that can also be sampled by a later pass.
struct SampledTarget {
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// Owns the GPU context and every pass of the frame pipeline.
pub struct Renderer {
    gpu: GpuContext,
    textures: TextureLibrary,
    assets_dir: PathBuf,

    scene_pipeline: ScenePipeline,
    skybox_pipeline: SkyboxPipeline,
    bloom: BloomPipeline,
    fxaa: FxaaPipeline,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    sky_buffer: wgpu::Buffer,
    sky_bind_group: wgpu::BindGroup,
    stars: std::sync::Arc<BoundTexture>,

    hdr: SampledTarget,
    depth_view: wgpu::TextureView,
    post: SampledTarget,

    drawables: HashMap<NodeId, Drawable>,
}

impl Renderer {
    pub fn new(gpu: GpuContext, assets_dir: PathBuf, bloom_params: BloomParams) -> Self {
        let device = &gpu.device;
        let width = gpu.surface_config.width;
        let height = gpu.surface_config.height;

        let mut textures = TextureLibrary::new(device);
        let scene_pipeline = ScenePipeline::new(device, textures.layout(), HDR_FORMAT, DEPTH_FORMAT);
        let skybox_pipeline = SkyboxPipeline::new(device, textures.layout(), HDR_FORMAT, DEPTH_FORMAT);
        let bloom = BloomPipeline::new(device, HDR_FORMAT, POST_FORMAT, width, height, bloom_params);
        let fxaa = FxaaPipeline::new(device, bloom.texture_layout(), gpu.surface_format, width, height);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame-uniform"),
            contents: bytemuck::cast_slice(&[FrameUniform::new(
                Mat4::IDENTITY,
                Vec3::ZERO,
                Vec3::ZERO,
                SUN_LIGHT_INTENSITY,
                SUN_LIGHT_RANGE,
                SUN_LIGHT_DECAY,
                AMBIENT_LIGHT_COLOR,
                AMBIENT_LIGHT_INTENSITY,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-uniform-bg"),
            layout: &scene_pipeline.frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sky_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky-uniform"),
            contents: bytemuck::cast_slice(&[SkyUniform::new(Mat4::IDENTITY, Mat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sky_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky-uniform-bg"),
            layout: &skybox_pipeline.sky_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sky_buffer.as_entire_binding(),
            }],
        });

        let stars = textures.resolve(
            &gpu.device,
            &gpu.queue,
            &assets_dir,
            &orrery_scene::TextureRef::new(STARS_TEXTURE),
        );

        let hdr = sampled_target(device, bloom.texture_layout(), bloom.sampler(), HDR_FORMAT, width, height, "hdr");
        let depth_view = depth_target(device, width, height);
        let post = sampled_target(device, bloom.texture_layout(), bloom.sampler(), POST_FORMAT, width, height, "post");

        Self {
            gpu,
            textures,
            assets_dir,
            scene_pipeline,
            skybox_pipeline,
            bloom,
            fxaa,
            frame_buffer,
            frame_bind_group,
            sky_buffer,
            sky_bind_group,
            stars,
            hdr,
            depth_view,
            post,
            drawables: HashMap::new(),
        }
    }

    /// Resize the surface and every screen-sized target.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let width = self.gpu.surface_config.width;
        let height = self.gpu.surface_config.height;

        self.hdr = sampled_target(
            &self.gpu.device,
            self.bloom.texture_layout(),
            self.bloom.sampler(),
            HDR_FORMAT,
            width,
            height,
            "hdr",
        );
        self.depth_view = depth_target(&self.gpu.device, width, height);
        self.post = sampled_target(
            &self.gpu.device,
            self.bloom.texture_layout(),
            self.bloom.sampler(),
            POST_FORMAT,
            width,
            height,
            "post",
        );
        self.bloom.resize(&self.gpu.device, width, height);
        self.fxaa.resize(&self.gpu.queue, width, height);
    }

    /// Update bloom parameters.
    pub fn set_bloom_params(&mut self, params: BloomParams) {
        self.bloom.set_params(&self.gpu.queue, params);
    }

    /// Render the scene from `camera` and present.
    pub fn render(&mut self, scene: &SceneGraph, camera: &OrbitCamera) -> Result<(), GpuError> {
        // One walk collects world transforms for geometry and locates the
        // point light.
        let mut geometry: Vec<(NodeId, Mat4)> = Vec::new();
        let mut light: Option<(Vec3, f32, f32, f32)> = None;
        scene.visit(|id, node, world| match node.kind() {
            NodeKind::Sphere { .. } | NodeKind::Annulus { .. } => geometry.push((id, world)),
            NodeKind::PointLight {
                intensity,
                range,
                decay,
            } => {
                light = Some((world.transform_point3(Vec3::ZERO), *intensity, *range, *decay));
            }
            NodeKind::Group => {}
        });

        self.prepare_drawables(scene, &geometry);

        let (light_position, intensity, range, decay) = light.unwrap_or((
            Vec3::ZERO,
            SUN_LIGHT_INTENSITY,
            SUN_LIGHT_RANGE,
            SUN_LIGHT_DECAY,
        ));
        let frame_uniform = FrameUniform::new(
            camera.view_projection_matrix(),
            camera.position(),
            light_position,
            intensity,
            range,
            decay,
            AMBIENT_LIGHT_COLOR,
            AMBIENT_LIGHT_INTENSITY,
        );
        self.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[frame_uniform]));

        let sky_uniform = SkyUniform::new(camera.projection_matrix(), camera.view_matrix());
        self.gpu
            .queue
            .write_buffer(&self.sky_buffer, 0, bytemuck::cast_slice(&[sky_uniform]));

        for (id, world) in &geometry {
            if let Some(drawable) = self.drawables.get(id) {
                let uniform = if drawable.emissive > 0.0 {
                    ModelUniform::emissive(*world, drawable.emissive)
                } else {
                    ModelUniform::lit(*world)
                };
                self.gpu.queue.write_buffer(
                    &drawable.model_buffer,
                    0,
                    bytemuck::cast_slice(&[uniform]),
                );
            }
        }

        let frame = self.gpu.acquire_frame()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.hdr.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // Background first, depth writes off, then the lit scene on top.
            pass.set_pipeline(&self.skybox_pipeline.pipeline);
            pass.set_bind_group(0, &self.sky_bind_group, &[]);
            pass.set_bind_group(1, &self.stars.bind_group, &[]);
            pass.draw(0..3, 0..1);

            pass.set_pipeline(&self.scene_pipeline.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (id, _) in &geometry {
                if let Some(drawable) = self.drawables.get(id) {
                    pass.set_bind_group(1, &drawable.texture.bind_group, &[]);
                    pass.set_bind_group(2, &drawable.model_bind_group, &[]);
                    drawable.mesh.draw(&mut pass);
                }
            }
        }

        self.bloom.record(&mut encoder, &self.hdr.bind_group, &self.post.view);
        self.fxaa.record(&mut encoder, &self.post.bind_group, &surface_view);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Build GPU resources for any geometry node not yet seen.
    fn prepare_drawables(&mut self, scene: &SceneGraph, geometry: &[(NodeId, Mat4)]) {
        for (id, _) in geometry {
            if self.drawables.contains_key(id) {
                continue;
            }
            let node = scene.node(*id);
            let (mesh, texture_ref) = match node.kind() {
                NodeKind::Sphere { radius, texture } => {
                    (generate_uv_sphere(*radius), texture.clone())
                }
                NodeKind::Annulus {
                    inner_radius,
                    outer_radius,
                    texture,
                } => (generate_annulus(*inner_radius, *outer_radius), texture.clone()),
                _ => continue,
            };

            let emissive = if is_light_bearer(scene, node) {
                SUN_EMISSIVE_STRENGTH
            } else {
                0.0
            };

            let mesh = mesh.upload(&self.gpu.device, texture_ref.name());
            let texture = self.textures.resolve(
                &self.gpu.device,
                &self.gpu.queue,
                &self.assets_dir,
                &texture_ref,
            );

            let model_buffer = self
                .gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model-uniform"),
                    contents: bytemuck::cast_slice(&[ModelUniform::lit(Mat4::IDENTITY)]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
            let model_bind_group = self
                .gpu
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("model-uniform-bg"),
                    layout: &self.scene_pipeline.model_bind_group_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: model_buffer.as_entire_binding(),
                    }],
                });

            self.drawables.insert(
                *id,
                Drawable {
                    mesh,
                    texture,
                    model_buffer,
                    model_bind_group,
                    emissive,
                },
            );
        }
    }
}

/// True for a body that carries the scene's point light (the sun): it is
/// drawn emissive instead of lit.
fn is_light_bearer(scene: &SceneGraph, node: &Node) -> bool {
    node.children()
        .iter()
        .any(|&child| matches!(scene.node(child).kind(), NodeKind::PointLight { .. }))
}

/// Adapter plugging the renderer into the animation driver's frame seam.
///
/// A failed frame is logged and skipped; presentation errors never stop the
/// animation.
pub struct RenderSink<'a> {
    pub renderer: &'a mut Renderer,
    pub camera: &'a OrbitCamera,
}

impl FrameSink for RenderSink<'_> {
    fn present_frame(&mut self, scene: &SceneGraph) {
        if let Err(e) = self.renderer.render(scene, self.camera) {
            log::warn!("Dropped frame: {e}");
        }
    }
}

fn sampled_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    label: &str,
) -> SampledTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
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
    SampledTarget { view, bind_group }
}

fn depth_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
