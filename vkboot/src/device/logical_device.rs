use std::ffi::{c_char, CString};
use std::sync::Arc;

use ash::vk;
use derivative::Derivative;

use crate::error::{BootError, Result, Stage};
use crate::traits::Destructible;

#[derive(Derivative)]
#[derivative(Debug)]
struct LogicalDeviceInner {
    #[derivative(Debug = "ignore")]
    handle: ash::Device,
    /// Contains queue families used
    queue_families: Vec<u32>,
    /// Enabled extensions
    enabled_extensions: Vec<CString>,
}

/// Effectively the same as [`ash::Device`], shared through an [`Arc`]
///
/// Cloning does not duplicate the device; it is destroyed once through [`Destructible`],
/// normally by the [`DeletionStack`](crate::util::DeletionStack) that recorded its creation.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct LogicalDevice {
    #[derivative(Debug = "ignore")]
    inner: Arc<LogicalDeviceInner>,
}

pub struct LogicalDeviceCreateInfo<'a> {
    pub instance: &'a ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device_ci: vk::DeviceCreateInfo<'a>,
    /// Distinct queue families requested in `device_ci`
    pub queue_families: Vec<u32>,
    pub enabled_extensions: Vec<CString>,
}

impl LogicalDevice {
    pub fn new(device_ci: LogicalDeviceCreateInfo) -> Result<Self> {
        let device = unsafe {
            device_ci
                .instance
                .create_device(device_ci.physical_device, &device_ci.device_ci, None)
        }
        .map_err(BootError::rejected(Stage::LogicalDevice))?;

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Creating VkDevice {:p}", device.handle());

        Ok(Self {
            inner: Arc::new(LogicalDeviceInner {
                handle: device,
                queue_families: device_ci.queue_families,
                enabled_extensions: device_ci.enabled_extensions,
            }),
        })
    }

    pub fn has_extension(&self, ext: *const c_char) -> bool {
        self.inner
            .enabled_extensions
            .contains(&crate::util::wrap_c_str(ext))
    }

    /// Get reference to the underlying [`ash::Device`]
    pub fn get_handle(&self) -> &ash::Device {
        &self.inner.handle
    }

    /// Acquire the queue at `index` of `family_index`
    pub fn get_queue(&self, family_index: u32, index: u32) -> crate::device::Queue {
        let queue = unsafe { self.inner.handle.get_device_queue(family_index, index) };
        crate::device::Queue::new(queue, family_index, index)
    }

    pub fn get_used_queue_families(&self) -> &[u32] {
        self.inner.queue_families.as_slice()
    }
}

impl Destructible for LogicalDevice {
    fn destroy(&mut self) {
        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Destroying VkDevice {:p}", self.inner.handle.handle());

        unsafe {
            self.inner.handle.destroy_device(None);
        }
    }
}
