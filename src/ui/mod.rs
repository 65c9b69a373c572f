pub mod gui;

pub use gui::{FrameStats, Ui};
