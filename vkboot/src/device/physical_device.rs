use std::ffi::CString;
use std::ops::Deref;

use ash::vk;

use crate::bootstrap::probe::DeviceProbe;

#[derive(Clone, Debug)]
pub struct PhysicalDevice {
    /// Handle to underlying physical device
    handle: vk::PhysicalDevice,

    /// Properties of the [`vk::PhysicalDevice`]
    properties: vk::PhysicalDeviceProperties,

    /// Queue families of the [`vk::PhysicalDevice`], in driver order
    available_queue_families: Vec<vk::QueueFamilyProperties>,
}

impl PhysicalDevice {
    /// Reads the properties and queue families of `handle`
    pub fn new<P: DeviceProbe>(probe: &P, handle: vk::PhysicalDevice) -> Self {
        Self {
            handle,
            properties: probe.properties(handle),
            available_queue_families: probe.queue_families(handle),
        }
    }

    /// References the underlying [`VkPhysicalDevice`](vk::PhysicalDevice)
    pub fn get_handle(&self) -> &vk::PhysicalDevice {
        &self.handle
    }

    /// Copies the underlying [`VkPhysicalDevice`](vk::PhysicalDevice)
    pub fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    /// Get the properties of the physical device
    pub fn get_properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Get the queue families
    pub fn get_total_queue_families(&self) -> &[vk::QueueFamilyProperties] {
        self.available_queue_families.as_slice()
    }

    /// Name the driver reports for the device
    pub fn name(&self) -> CString {
        crate::util::fixed_c_str(&self.properties.device_name)
    }

    pub fn is_discrete(&self) -> bool {
        self.properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
    }
}

impl Deref for PhysicalDevice {
    type Target = vk::PhysicalDevice;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
