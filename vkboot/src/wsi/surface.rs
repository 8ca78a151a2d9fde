use ash::vk;
use derivative::Derivative;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::{BootError, Result, Stage};
use crate::traits::Destructible;

/// A [`VkSurfaceKHR`](vk::SurfaceKHR) bound to a native window
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Surface {
    handle: vk::SurfaceKHR,
    #[derivative(Debug = "ignore")]
    ext: ash::khr::surface::Instance,
}

impl Surface {
    /// Binds `window` to the instance. Capabilities, formats and present modes are queried per
    /// physical device, see [`SurfaceProbe`](crate::bootstrap::probe::SurfaceProbe).
    pub fn new<T>(
        instance: &crate::core::Instance,
        functions: &crate::core::InstanceFunctions,
        window: &T,
    ) -> Result<Self>
    where
        T: HasWindowHandle + HasDisplayHandle,
    {
        let handle = unsafe {
            ash_window::create_surface(
                instance.get_entry(),
                instance.get_instance(),
                window.display_handle()?.as_raw(),
                window.window_handle()?.as_raw(),
                None,
            )
        }
        .map_err(BootError::rejected(Stage::Surface))?;

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Creating VkSurface {:p}", handle);

        Ok(Self {
            handle,
            ext: functions.surface.clone(),
        })
    }

    /// Get a reference to the underlying [SurfaceKHR](vk::SurfaceKHR)
    pub fn get_handle(&self) -> &vk::SurfaceKHR {
        &self.handle
    }

    /// Get a copy over the underlying [SurfaceKHR](vk::SurfaceKHR)
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    pub fn get_extension(&self) -> &ash::khr::surface::Instance {
        &self.ext
    }
}

impl Destructible for Surface {
    fn destroy(&mut self) {
        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Destroying VkSurface {:p}", self.handle);

        unsafe {
            self.ext.destroy_surface(self.handle, None);
        }
    }
}
