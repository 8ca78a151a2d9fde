use std::ffi::{c_char, CString};
use std::ptr;

use ash::vk;

use crate::bootstrap::physical_device::SelectedDevice;
use crate::device::{LogicalDevice, LogicalDeviceCreateInfo, QueueHandles};
use crate::error::Result;

/// Every queue is requested at this priority
pub const QUEUE_PRIORITY: f32 = 1.0;

/// Builds a logical device for a [`SelectedDevice`]
///
/// One queue is requested from each distinct family. The swapchain extension is always enabled.
#[derive(Debug, Clone)]
pub struct LogicalDeviceBuilder {
    selected: SelectedDevice,
    extensions: Vec<CString>,
}

impl LogicalDeviceBuilder {
    pub fn new(selected: SelectedDevice) -> Self {
        Self {
            selected,
            extensions: vec![ash::khr::swapchain::NAME.to_owned()],
        }
    }

    /// Enables an additional device extension
    pub fn add_extension(mut self, name: *const c_char) -> Self {
        let name = crate::util::wrap_c_str(name);
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
        self
    }

    pub fn extensions(&self) -> &[CString] {
        &self.extensions
    }

    /// Distinct families to request, ascending
    pub fn queue_families(&self) -> Vec<u32> {
        self.selected.distinct_families()
    }

    pub fn build(self, instance: &crate::core::Instance) -> Result<(LogicalDevice, QueueHandles)> {
        let queue_families = self.queue_families();
        let priorities = [QUEUE_PRIORITY];
        let queue_cis: Vec<vk::DeviceQueueCreateInfo> = queue_families
            .iter()
            .map(|&queue_family_index| vk::DeviceQueueCreateInfo {
                s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
                p_next: ptr::null(),
                flags: vk::DeviceQueueCreateFlags::empty(),
                queue_family_index,
                queue_count: priorities.len() as u32,
                p_queue_priorities: priorities.as_ptr(),
                _marker: Default::default(),
            })
            .collect();
        let ext_cptrs: Vec<*const c_char> =
            self.extensions.iter().map(|name| name.as_ptr()).collect();
        let features = vk::PhysicalDeviceFeatures::default();

        #[allow(deprecated)]
        let device_ci = vk::DeviceCreateInfo {
            s_type: vk::StructureType::DEVICE_CREATE_INFO,
            p_next: ptr::null(),
            flags: vk::DeviceCreateFlags::empty(),
            queue_create_info_count: queue_cis.len() as u32,
            p_queue_create_infos: queue_cis.as_ptr(),
            enabled_layer_count: 0,
            pp_enabled_layer_names: ptr::null(),
            enabled_extension_count: ext_cptrs.len() as u32,
            pp_enabled_extension_names: ext_cptrs.as_ptr(),
            p_enabled_features: &features,
            _marker: Default::default(),
        };

        let device = LogicalDevice::new(LogicalDeviceCreateInfo {
            instance: instance.get_instance(),
            physical_device: self.selected.device.handle(),
            device_ci,
            queue_families,
            enabled_extensions: self.extensions,
        })?;

        let queues = QueueHandles {
            graphics: device.get_queue(self.selected.graphics_family, 0),
            present: device.get_queue(self.selected.present_family, 0),
        };
        tracing::info!(
            "Created logical device on families {:?} (shared queue: {})",
            device.get_used_queue_families(),
            queues.is_shared()
        );
        Ok((device, queues))
    }
}
