use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("sphere needs at least 2 subdivisions per axis, got {u}x{v}")]
    TooFewSubdivisions { u: u32, v: u32 },
    #[error("sphere with {u}x{v} subdivisions does not fit 32-bit vertex indices")]
    TooManySubdivisions { u: u32, v: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UniformError {
    #[error("uniform '{0}' is required by the active shading mode but was never set")]
    Missing(&'static str),
    #[error("uniform '{name}' holds a {found} but a {expected} was expected")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors that stop the renderer. Texture problems never end up here: they
/// are logged at load time and the slot stays unbound.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Uniform(#[from] UniformError),
    #[error("shader program '{label}' failed to compile: {message}")]
    ProgramCompile { label: String, message: String },
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("GPU ran out of memory")]
    OutOfMemory,
}
