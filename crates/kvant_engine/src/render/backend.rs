//! Graphics backend abstraction
//!
//! The render system never talks to a graphics API directly. It uploads mesh
//! data and submits indexed draws through [`GraphicsBackend`]; everything
//! device-specific stays behind that trait.

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// GPU resource creation failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A draw or frame operation failed
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Mesh data is malformed
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Handles of a mesh that has been uploaded to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshBuffers {
    /// Vertex array (input layout) handle
    pub vertex_array: u32,
    /// Vertex buffer handle
    pub vertex_buffer: u32,
    /// Index buffer handle
    pub index_buffer: u32,
    /// Number of indices to draw
    pub index_count: u32,
}

/// Device-facing half of the renderer
pub trait GraphicsBackend {
    /// Start a frame, clearing the target
    fn begin_frame(&mut self, clear_color: [f32; 4]);

    /// Upload interleaved vertex bytes and 32-bit indices
    fn upload_mesh(&mut self, vertex_bytes: &[u8], stride: usize, indices: &[u32]) -> RenderResult<MeshBuffers>;

    /// Issue an indexed draw with the currently bound program and textures
    fn draw_indexed(&mut self, buffers: &MeshBuffers) -> RenderResult<()>;

    /// Finish and present the frame
    fn end_frame(&mut self);
}

/// Backend that validates and records work without a GPU
///
/// Used by the demo application and by tests to observe draw order.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    frames: u64,
    total_draws: u64,
    next_handle: u32,
    in_frame: bool,
    clear_color: [f32; 4],
    frame_draws: Vec<MeshBuffers>,
    uploads: Vec<MeshBuffers>,
}

impl HeadlessBackend {
    /// Create a headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed frames
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Draw calls accepted since creation
    pub fn total_draw_calls(&self) -> u64 {
        self.total_draws
    }

    /// Draws of the current (or last finished) frame, in submission order
    pub fn frame_draws(&self) -> &[MeshBuffers] {
        &self.frame_draws
    }

    /// Every upload performed, in order
    pub fn uploads(&self) -> &[MeshBuffers] {
        &self.uploads
    }

    /// Clear color of the most recent frame
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        if self.in_frame {
            log::warn!("begin_frame called twice without end_frame");
        }
        self.in_frame = true;
        self.clear_color = clear_color;
        self.frame_draws.clear();
    }

    fn upload_mesh(&mut self, vertex_bytes: &[u8], stride: usize, indices: &[u32]) -> RenderResult<MeshBuffers> {
        if stride == 0 || vertex_bytes.len() % stride != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "{} vertex bytes do not divide into stride {}",
                vertex_bytes.len(),
                stride
            )));
        }

        let vertex_count = vertex_bytes.len() / stride;
        if let Some(index) = indices.iter().find(|index| **index as usize >= vertex_count) {
            return Err(RenderError::InvalidMesh(format!(
                "index {index} out of range for {vertex_count} vertices"
            )));
        }

        let index_count = u32::try_from(indices.len())
            .map_err(|_| RenderError::ResourceCreationFailed("index buffer too large".to_string()))?;

        let buffers = MeshBuffers {
            vertex_array: self.allocate(),
            vertex_buffer: self.allocate(),
            index_buffer: self.allocate(),
            index_count,
        };
        log::trace!("Uploaded mesh: {} vertices, {} indices", vertex_count, index_count);
        self.uploads.push(buffers);
        Ok(buffers)
    }

    fn draw_indexed(&mut self, buffers: &MeshBuffers) -> RenderResult<()> {
        if !self.in_frame {
            return Err(RenderError::RenderingFailed("draw outside of a frame".to_string()));
        }
        if !self.uploads.contains(buffers) {
            return Err(RenderError::RenderingFailed(format!("unknown buffers {buffers:?}")));
        }
        self.frame_draws.push(*buffers);
        self.total_draws += 1;
        Ok(())
    }

    fn end_frame(&mut self) {
        if !self.in_frame {
            log::warn!("end_frame called without begin_frame");
            return;
        }
        self.in_frame = false;
        self.frames += 1;
    }
}
