//! Rendering
//!
//! The render companions attached next to a [`Node`](crate::scene::Node)
//! (mesh, material, camera), the capabilities the renderer consumes from the
//! outside (shader programs, bindable textures, a graphics backend), and the
//! post-order render system that walks one layer at a time.

pub mod backend;
pub mod camera;
pub mod material;
pub mod mesh;
pub mod render_system;
pub mod texture;

pub use backend::{GraphicsBackend, HeadlessBackend, MeshBuffers, RenderError, RenderResult};
pub use camera::{Camera, CameraView};
pub use material::{HeadlessProgram, Material, ShaderProgram, Uniform};
pub use mesh::{MeshRenderer, Vertex};
pub use render_system::{RenderContext, RenderStats, RenderSystem, MAX_TEXTURE_UNITS};
pub use texture::{BindableTexture, HeadlessTexture, TextureProvider, TextureRegistry};
