//! Mesh renderer component
//!
//! Geometry lives on the CPU until the node is first drawn; the upload then
//! happens through whatever backend is drawing, and the returned buffer
//! handles are kept on the component.

use crate::ecs::Component;

use super::backend::{GraphicsBackend, MeshBuffers, RenderResult};

/// Interleaved vertex: position, color, texture coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Vertex color
    pub color: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

/// Floats per interleaved vertex
const VERTEX_FLOATS: usize = 8;

impl Vertex {
    /// Size of one interleaved vertex in bytes
    pub const STRIDE: usize = VERTEX_FLOATS * std::mem::size_of::<f32>();

    /// Create a new vertex
    pub fn new(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, color, uv }
    }

    fn to_array(self) -> [f32; VERTEX_FLOATS] {
        let [x, y, z] = self.position;
        let [r, g, b] = self.color;
        let [u, v] = self.uv;
        [x, y, z, r, g, b, u, v]
    }
}

/// Interleave vertices into the byte layout uploaded to the backend
pub fn vertex_bytes(vertices: &[Vertex]) -> Vec<u8> {
    let packed: Vec<[f32; VERTEX_FLOATS]> = vertices.iter().map(|vertex| vertex.to_array()).collect();
    bytemuck::cast_slice(&packed).to_vec()
}

/// Geometry and texture list of a drawable node
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<String>,
    buffers: Option<MeshBuffers>,
}

impl Component for MeshRenderer {}

impl MeshRenderer {
    /// Create a renderer from indexed geometry
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            textures: Vec::new(),
            buffers: None,
        }
    }

    /// Unit quad centered on the origin, two triangles, full UV range
    pub fn quad(size: f32, color: [f32; 3]) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vertex::new([-h, -h, 0.0], color, [0.0, 1.0]),
            Vertex::new([h, -h, 0.0], color, [1.0, 1.0]),
            Vertex::new([h, h, 0.0], color, [1.0, 0.0]),
            Vertex::new([-h, h, 0.0], color, [0.0, 0.0]),
        ];
        Self::new(vertices, vec![0, 1, 2, 2, 3, 0])
    }

    /// Builder-style texture append
    pub fn with_texture(mut self, name: impl Into<String>) -> Self {
        self.add_texture(name);
        self
    }

    /// Append a texture; its position in the list is its texture unit
    pub fn add_texture(&mut self, name: impl Into<String>) {
        self.textures.push(name.into());
    }

    /// Texture names in unit order
    pub fn textures(&self) -> &[String] {
        &self.textures
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index data
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Replace the geometry, dropping any uploaded buffers
    pub fn set_geometry(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>) {
        self.vertices = vertices;
        self.indices = indices;
        self.buffers = None;
    }

    /// Buffer handles, once uploaded
    pub fn buffers(&self) -> Option<MeshBuffers> {
        self.buffers
    }

    /// Upload the geometry if that has not happened yet
    pub fn ensure_uploaded(&mut self, backend: &mut dyn GraphicsBackend) -> RenderResult<MeshBuffers> {
        if let Some(buffers) = self.buffers {
            return Ok(buffers);
        }
        let buffers = backend.upload_mesh(&vertex_bytes(&self.vertices), Vertex::STRIDE, &self.indices)?;
        self.buffers = Some(buffers);
        Ok(buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    #[test]
    fn test_vertex_layout() {
        let bytes = vertex_bytes(&[Vertex::new([1.0, 2.0, 3.0], [0.5, 0.5, 0.5], [0.0, 1.0])]);
        assert_eq!(bytes.len(), Vertex::STRIDE);
        assert_eq!(Vertex::STRIDE, std::mem::size_of::<Vertex>());

        let expected: Vec<u8> = [1.0f32, 2.0, 3.0, 0.5, 0.5, 0.5, 0.0, 1.0]
            .iter()
            .flat_map(|value| value.to_ne_bytes())
            .collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_upload_happens_once() {
        let mut backend = HeadlessBackend::new();
        let mut mesh = MeshRenderer::quad(1.0, [1.0, 1.0, 1.0]);
        assert!(mesh.buffers().is_none());

        let first = mesh.ensure_uploaded(&mut backend).unwrap();
        let second = mesh.ensure_uploaded(&mut backend).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.index_count, 6);
        assert_eq!(backend.uploads().len(), 1);

        mesh.set_geometry(Vec::new(), Vec::new());
        assert!(mesh.buffers().is_none());
    }
}
