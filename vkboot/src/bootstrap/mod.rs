/// Set of utilities structs and methods which streamline the Vulkan initialization process
/// Inspired heavily by [vk-bootstrap](https://github.com/charles-lunarg/vk-bootstrap)
pub mod app_info;
pub mod init;
pub mod instance;
pub mod logical_device;
pub mod physical_device;
pub mod probe;
pub mod swapchain;

pub use app_info::{AppSettings, DiagnosticSettings};
pub use init::{RenderContext, Teardown, CREATION_ORDER};
pub use instance::{InstanceBuilder, InstancePlan};
pub use logical_device::LogicalDeviceBuilder;
pub use physical_device::{
    choose_candidate, DeviceCandidate, PhysicalDeviceSelector, SelectedDevice,
};
pub use probe::{DeviceProbe, LayerProbe, PresentationProbe, SurfaceProbe};
pub use swapchain::{ImageSharing, SurfaceNegotiation, SwapchainBuilder, SwapchainPlan};
