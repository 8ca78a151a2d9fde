pub mod bootstrap;
pub mod core;
pub mod device;
pub mod error;
pub mod resource;
pub mod traits;
pub mod util;
pub mod wsi;

pub use bootstrap::{AppSettings, DiagnosticSettings, RenderContext};
pub use error::{BootError, ErrorKind, Result, Stage};

// Re-exports
#[cfg(feature = "winit")]
pub use winit;
pub use {ash, ash_window, raw_window_handle};
