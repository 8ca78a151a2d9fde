//! Read-only driver queries the pipeline makes, behind traits so selection and negotiation can
//! be driven by an in-memory driver.
use std::ffi::CString;

use ash::vk;

use crate::error::{BootError, Result};

/// Instance level layer enumeration
pub trait LayerProbe {
    /// Names of every layer the driver reports, in driver order
    fn instance_layers(&self) -> Result<Vec<CString>>;
}

impl LayerProbe for ash::Entry {
    fn instance_layers(&self) -> Result<Vec<CString>> {
        let layers = unsafe { self.enumerate_instance_layer_properties() }
            .map_err(BootError::query("instance layers"))?;
        Ok(layers
            .iter()
            .map(|layer| crate::util::fixed_c_str(&layer.layer_name))
            .collect())
    }
}

/// Per physical device queries against one presentation surface
pub trait DeviceProbe {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>>;

    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties;

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Whether `family_index` of `device` can present to the probed surface
    fn supports_present(&self, device: vk::PhysicalDevice, family_index: u32) -> Result<bool>;
}

/// Presentation capabilities of a surface for a given physical device
pub trait SurfaceProbe {
    fn capabilities(&self, device: vk::PhysicalDevice) -> Result<vk::SurfaceCapabilitiesKHR>;

    fn formats(&self, device: vk::PhysicalDevice) -> Result<Vec<vk::SurfaceFormatKHR>>;

    fn present_modes(&self, device: vk::PhysicalDevice) -> Result<Vec<vk::PresentModeKHR>>;
}

/// [`DeviceProbe`] backed by a live instance and surface
pub struct PresentationProbe<'a> {
    instance: &'a ash::Instance,
    surface: &'a crate::wsi::Surface,
}

impl<'a> PresentationProbe<'a> {
    pub fn new(instance: &'a ash::Instance, surface: &'a crate::wsi::Surface) -> Self {
        Self { instance, surface }
    }
}

impl DeviceProbe for PresentationProbe<'_> {
    fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }
            .map_err(BootError::query("physical devices"))
    }

    fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        unsafe { self.instance.get_physical_device_properties(device) }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe { self.instance.get_physical_device_queue_family_properties(device) }
    }

    fn supports_present(&self, device: vk::PhysicalDevice, family_index: u32) -> Result<bool> {
        unsafe {
            self.surface
                .get_extension()
                .get_physical_device_surface_support(device, family_index, self.surface.handle())
        }
        .map_err(BootError::query("surface support"))
    }
}

impl SurfaceProbe for crate::wsi::Surface {
    fn capabilities(&self, device: vk::PhysicalDevice) -> Result<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.get_extension()
                .get_physical_device_surface_capabilities(device, self.handle())
        }
        .map_err(BootError::query("surface capabilities"))
    }

    fn formats(&self, device: vk::PhysicalDevice) -> Result<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.get_extension()
                .get_physical_device_surface_formats(device, self.handle())
        }
        .map_err(BootError::query("surface formats"))
    }

    fn present_modes(&self, device: vk::PhysicalDevice) -> Result<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.get_extension()
                .get_physical_device_surface_present_modes(device, self.handle())
        }
        .map_err(BootError::query("surface present modes"))
    }
}
