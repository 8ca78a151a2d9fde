/// Top-level driver connection and the entry points resolved through it
pub mod extensions;
pub mod instance;

pub use extensions::{DeviceFunctions, InstanceFunctions};
pub use instance::Instance;
