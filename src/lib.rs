pub mod app;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod params;
pub mod render;
pub mod shading;
pub mod ui;

pub use app::App;
pub use camera::Camera;
pub use error::{GeometryError, RenderError, UniformError};
pub use params::ShadingParams;
