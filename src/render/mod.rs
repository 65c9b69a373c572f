pub mod environment;
pub mod frame;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod uniforms;

pub use frame::{FramePlan, FramePlanner, PassKind};
pub use pipeline::SphereProgram;
pub use renderer::{Renderer, RendererSettings};
pub use texture::{RenderTarget, Texture};
pub use uniforms::{TextureSlot, UniformTable, UniformValue};
