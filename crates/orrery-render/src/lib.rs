//! wgpu rendering collaborator for the orrery scene graph.
//!
//! Owns the device and surface, loads textures, builds GPU meshes for scene
//! nodes, and composites each frame through an HDR scene pass, bloom, and
//! FXAA before presenting.

pub mod bloom;
pub mod camera;
pub mod frame;
pub mod fxaa;
pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod skybox;
pub mod texture;
pub mod viewport;

pub use bloom::{BloomParams, BloomPipeline};
pub use camera::OrbitCamera;
pub use frame::{RenderSink, Renderer};
pub use fxaa::FxaaPipeline;
pub use gpu::{GpuContext, GpuError, init_gpu_blocking};
pub use mesh::{GpuMesh, Mesh, Vertex, generate_annulus, generate_uv_sphere};
pub use pipeline::ScenePipeline;
pub use skybox::SkyboxPipeline;
pub use texture::{TextureError, TextureLibrary};
pub use viewport::{Viewport, ViewportResize};
