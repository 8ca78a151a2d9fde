use ash::vk;
use derivative::Derivative;

use crate::error::{BootError, Result, Stage};
use crate::traits::Destructible;

/// A created [`VkSwapchainKHR`](vk::SwapchainKHR) together with the parameters it was
/// negotiated with
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Swapchain {
    handle: vk::SwapchainKHR,
    #[derivative(Debug = "ignore")]
    ext: ash::khr::swapchain::Device,
    device: crate::device::LogicalDevice,

    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    sharing_mode: vk::SharingMode,
}

impl Swapchain {
    /// Construct a basic swapchain. For negotiated creation, see
    /// [`bootstrap::SwapchainBuilder`](crate::bootstrap::SwapchainBuilder).
    pub fn new(
        functions: &crate::core::DeviceFunctions,
        device: crate::device::LogicalDevice,
        swapchain_ci: &vk::SwapchainCreateInfoKHR,
    ) -> Result<Self> {
        let ext = functions.swapchain.clone();
        let handle = unsafe { ext.create_swapchain(swapchain_ci, None) }
            .map_err(BootError::rejected(Stage::Swapchain))?;

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Creating VkSwapchainKHR {:p}", handle);

        Ok(Self {
            handle,
            ext,
            device,
            format: swapchain_ci.image_format,
            color_space: swapchain_ci.image_color_space,
            present_mode: swapchain_ci.present_mode,
            extent: swapchain_ci.image_extent,
            sharing_mode: swapchain_ci.image_sharing_mode,
        })
    }

    /// Get the underlying [`VkSwapchainKHR`](vk::SwapchainKHR)
    pub fn get_handle(&self) -> &vk::SwapchainKHR {
        &self.handle
    }

    /// Get the underlying device extension
    pub fn get_ext(&self) -> &ash::khr::swapchain::Device {
        &self.ext
    }

    /// Presentable images, in the order the driver reports them
    pub fn get_images(&self) -> Result<Vec<vk::Image>> {
        unsafe { self.ext.get_swapchain_images(self.handle) }
            .map_err(BootError::rejected(Stage::Swapchain))
    }

    pub fn get_device(&self) -> &crate::device::LogicalDevice {
        &self.device
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn color_space(&self) -> vk::ColorSpaceKHR {
        self.color_space
    }

    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn sharing_mode(&self) -> vk::SharingMode {
        self.sharing_mode
    }
}

impl Destructible for Swapchain {
    fn destroy(&mut self) {
        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Destroying VkSwapchainKHR {:p}", self.handle);

        unsafe {
            self.ext.destroy_swapchain(self.handle, None);
        }
    }
}
