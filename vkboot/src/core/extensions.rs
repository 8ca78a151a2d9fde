//! Extension entry points are not statically linked. They are looked up by name once, right
//! after the object they hang off of is created, and handed to later stages as typed tables.
use std::ffi::CStr;

use derivative::Derivative;

use crate::error::{BootError, Result};

const SURFACE_ENTRY_POINTS: &[&CStr] = &[
    c"vkDestroySurfaceKHR",
    c"vkGetPhysicalDeviceSurfaceSupportKHR",
    c"vkGetPhysicalDeviceSurfaceCapabilitiesKHR",
    c"vkGetPhysicalDeviceSurfaceFormatsKHR",
    c"vkGetPhysicalDeviceSurfacePresentModesKHR",
];

const DEBUG_UTILS_ENTRY_POINTS: &[&CStr] = &[
    c"vkCreateDebugUtilsMessengerEXT",
    c"vkDestroyDebugUtilsMessengerEXT",
];

const SWAPCHAIN_ENTRY_POINTS: &[&CStr] = &[
    c"vkCreateSwapchainKHR",
    c"vkDestroySwapchainKHR",
    c"vkGetSwapchainImagesKHR",
];

/// Checks every name resolves, failing on the first that does not
pub fn verify_entry_points<F>(names: &[&CStr], mut resolves: F) -> Result<()>
where
    F: FnMut(&CStr) -> bool,
{
    match names.iter().find(|name| !resolves(name)) {
        Some(name) => Err(BootError::UnresolvedEntryPoint(
            name.to_string_lossy().into_owned(),
        )),
        None => Ok(()),
    }
}

/// Instance level extension tables
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct InstanceFunctions {
    #[derivative(Debug = "ignore")]
    pub surface: ash::khr::surface::Instance,
    /// Present only when instrumentation was requested
    #[derivative(Debug = "ignore")]
    pub debug_utils: Option<ash::ext::debug_utils::Instance>,
}

impl InstanceFunctions {
    pub fn resolve(instance: &crate::core::Instance, debug_utils: bool) -> Result<Self> {
        let get_instance_proc_addr = instance.get_entry().static_fn().get_instance_proc_addr;
        let resolves = |name: &CStr| unsafe {
            get_instance_proc_addr(instance.handle(), name.as_ptr()).is_some()
        };

        verify_entry_points(SURFACE_ENTRY_POINTS, resolves)?;
        if debug_utils {
            verify_entry_points(DEBUG_UTILS_ENTRY_POINTS, resolves)?;
        }

        let entry = instance.get_entry();
        let handle = instance.get_instance();
        Ok(Self {
            surface: ash::khr::surface::Instance::new(entry, handle),
            debug_utils: debug_utils.then(|| ash::ext::debug_utils::Instance::new(entry, handle)),
        })
    }
}

/// Device level extension tables
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct DeviceFunctions {
    #[derivative(Debug = "ignore")]
    pub swapchain: ash::khr::swapchain::Device,
}

impl DeviceFunctions {
    pub fn resolve(
        instance: &crate::core::Instance,
        device: &crate::device::LogicalDevice,
    ) -> Result<Self> {
        if !device.has_extension(ash::khr::swapchain::NAME.as_ptr()) {
            return Err(BootError::UnresolvedEntryPoint(
                SWAPCHAIN_ENTRY_POINTS[0].to_string_lossy().into_owned(),
            ));
        }
        let get_device_proc_addr = instance.get_instance().fp_v1_0().get_device_proc_addr;
        let handle = device.get_handle();
        verify_entry_points(SWAPCHAIN_ENTRY_POINTS, |name| unsafe {
            get_device_proc_addr(handle.handle(), name.as_ptr()).is_some()
        })?;
        Ok(Self {
            swapchain: ash::khr::swapchain::Device::new(instance.get_instance(), handle),
        })
    }
}
