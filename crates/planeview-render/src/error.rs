//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Surface configuration failed.
    #[error("surface configuration failed: {0}")]
    SurfaceConfigurationFailed(String),

    /// No bundled shader module with this name.
    #[error("shader library '{0}' not found")]
    ShaderNotFound(String),

    /// The shader module has no entry point with this name.
    #[error("shader function '{0}' not found")]
    FunctionNotFound(String),

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Pipeline creation failed.
    #[error("pipeline creation failed: {0}")]
    PipelineCreationFailed(String),

    /// Pixel buffer dimensions or data are inconsistent.
    #[error("invalid pixel buffer: {0}")]
    InvalidPixelBuffer(String),

    /// Reading back a presented frame failed.
    #[error("buffer map failed")]
    BufferMapFailed,

    /// The renderer thread could not be started.
    #[error("failed to start renderer thread: {0}")]
    WorkerSpawnFailed(#[from] std::io::Error),

    /// The renderer stopped after a fatal configuration error or a panic.
    #[error("renderer terminated")]
    RendererTerminated,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
