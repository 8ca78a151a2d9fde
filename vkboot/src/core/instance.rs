use std::ffi::CString;
use std::ops::Deref;
use std::sync::Arc;

use ash::vk;
use derivative::Derivative;

use crate::device::debug_utils::SinkSlot;
use crate::error::{BootError, Result, Stage};
use crate::traits::Destructible;

/// Represents a Vulkan Instance
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Instance {
    #[derivative(Debug = "ignore")]
    entry: ash::Entry,
    #[derivative(Debug = "ignore")]
    instance: ash::Instance,
    /// Instance extensions the instance was created with
    extensions: Vec<CString>,
    /// Layers the instance was created with
    layers: Vec<CString>,
    /// Receiver of driver messages. Must outlive the instance since messages emitted while
    /// destroying the instance are still delivered to it.
    #[derivative(Debug = "ignore")]
    sink: Option<Arc<SinkSlot>>,
}

impl Instance {
    /// Creates the instance from a fully linked create info.
    ///
    /// `sink` is the slot the create info's chained messenger points at, if any.
    pub(crate) fn new(
        entry: ash::Entry,
        instance_ci: &vk::InstanceCreateInfo,
        extensions: Vec<CString>,
        layers: Vec<CString>,
        sink: Option<Arc<SinkSlot>>,
    ) -> Result<Self> {
        let instance = unsafe { entry.create_instance(instance_ci, None) }
            .map_err(BootError::rejected(Stage::Instance))?;

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Creating VkInstance {:p}", instance.handle());

        Ok(Self {
            entry,
            instance,
            extensions,
            layers,
            sink,
        })
    }

    /// Get the [`ash::Entry`]
    pub fn get_entry(&self) -> &ash::Entry {
        &self.entry
    }

    /// Get the [`ash::Instance`]
    pub fn get_instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn handle(&self) -> vk::Instance {
        self.instance.handle()
    }

    pub fn enabled_extensions(&self) -> &[CString] {
        &self.extensions
    }

    pub fn enabled_layers(&self) -> &[CString] {
        &self.layers
    }

    pub(crate) fn sink_slot(&self) -> Option<&Arc<SinkSlot>> {
        self.sink.as_ref()
    }
}

impl Destructible for Instance {
    fn destroy(&mut self) {
        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Destroying VkInstance {:p}", self.instance.handle());

        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

impl Deref for Instance {
    type Target = ash::Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}
