pub mod builder;
pub mod core;
pub mod geometry;
pub mod lifecycle;
pub mod render;
pub mod runtime;
pub mod scope;
pub mod sim;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

use std::fmt;

#[derive(Debug)]
pub struct ViewerError;

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewerError")
    }
}

impl std::error::Error for ViewerError {}

pub type Result<T> = std::result::Result<T, error_stack::Report<ViewerError>>;

pub mod prelude {
    pub use crate::builder::*;
    pub use crate::core::*;
    pub use crate::render::RadarViewerPlugin;
    pub use crate::runtime::*;
    pub use crate::sim::{ViewerHandle, ViewerIntent};
    pub use crate::viewer::ViewerState;
}
