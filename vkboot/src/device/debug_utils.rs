//! Diagnostic channel: a [`VkDebugUtilsMessengerEXT`](vk::DebugUtilsMessengerEXT) forwarding
//! driver messages to a [`DiagnosticSink`].
use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use ash::vk;
use derivative::Derivative;

use crate::error::{BootError, Result, Stage};
use crate::traits::Destructible;

/// A single message emitted by the driver or a layer
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMessage<'a> {
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub kind: vk::DebugUtilsMessageTypeFlagsEXT,
    pub id_name: &'a str,
    pub id_number: i32,
    pub text: &'a str,
}

/// Receives driver messages for as long as the instance lives
///
/// Called from inside driver calls, possibly while the driver holds internal locks. Sinks must
/// not call back into Vulkan and must not panic.
pub trait DiagnosticSink: Send + Sync {
    fn receive(&self, message: &DiagnosticMessage<'_>);
}

/// Routes driver messages into [`tracing`]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn receive(&self, message: &DiagnosticMessage<'_>) {
        let DiagnosticMessage {
            severity,
            kind,
            id_name,
            id_number,
            text,
        } = *message;
        match severity {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
                tracing::error!("[{:?}]: {} ({}): {}", kind, id_name, id_number, text)
            }
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
                tracing::warn!("[{:?}]: {} ({}): {}", kind, id_name, id_number, text)
            }
            vk::DebugUtilsMessageSeverityFlagsEXT::INFO => {
                tracing::info!("[{:?}]: {} ({}): {}", kind, id_name, id_number, text)
            }
            _ => tracing::trace!("[{:?}]: {} ({}): {}", kind, id_name, id_number, text),
        }
    }
}

/// Heap slot whose address is handed to the driver as the callback's user data
pub(crate) struct SinkSlot {
    sink: Arc<dyn DiagnosticSink>,
}

impl SinkSlot {
    pub(crate) fn new(sink: Arc<dyn DiagnosticSink>) -> Arc<Self> {
        Arc::new(Self { sink })
    }

    fn user_data(self: &Arc<Self>) -> *mut c_void {
        Arc::as_ptr(self) as *mut c_void
    }
}

/// Builds the messenger create info shared by instance creation (chained) and the standalone
/// messenger. `slot` must stay alive for as long as the driver may call back.
pub(crate) fn messenger_create_info<'a>(
    severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    kinds: vk::DebugUtilsMessageTypeFlagsEXT,
    slot: &Arc<SinkSlot>,
) -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT {
        s_type: vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
        p_next: ptr::null(),
        flags: vk::DebugUtilsMessengerCreateFlagsEXT::empty(),
        message_severity: severities,
        message_type: kinds,
        pfn_user_callback: Some(vk_debug_callback),
        p_user_data: slot.user_data(),
        _marker: Default::default(),
    }
}

/// Represents a [`VkDebugUtilsMessengerEXT`](ash::ext::debug_utils)
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct DebugMessenger {
    #[derivative(Debug = "ignore")]
    handle: vk::DebugUtilsMessengerEXT,
    #[derivative(Debug = "ignore")]
    ext: ash::ext::debug_utils::Instance,
}

impl DebugMessenger {
    /// Registers the instance's sink with the given filters
    pub fn new(
        instance: &crate::core::Instance,
        functions: &crate::core::InstanceFunctions,
        severities: vk::DebugUtilsMessageSeverityFlagsEXT,
        kinds: vk::DebugUtilsMessageTypeFlagsEXT,
    ) -> Result<Self> {
        let (Some(ext), Some(slot)) = (functions.debug_utils.clone(), instance.sink_slot()) else {
            return Err(BootError::UnresolvedEntryPoint(
                "vkCreateDebugUtilsMessengerEXT".to_string(),
            ));
        };
        let debug_ci = messenger_create_info(severities, kinds, slot);
        let handle = unsafe { ext.create_debug_utils_messenger(&debug_ci, None) }
            .map_err(BootError::rejected(Stage::DiagnosticChannel))?;

        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Creating VkDebugUtilsMessenger {:p}", handle);

        Ok(Self { handle, ext })
    }

    pub fn handle(&self) -> vk::DebugUtilsMessengerEXT {
        self.handle
    }
}

impl Destructible for DebugMessenger {
    fn destroy(&mut self) {
        #[cfg(feature = "log-lifetimes")]
        tracing::trace!("Destroying VkDebugUtilsMessenger {:p}", self.handle);

        unsafe { self.ext.destroy_debug_utils_messenger(self.handle, None) }
    }
}

/// the callback function used in Debug Utils.
/// thanks phobos https://github.com/NotAPenguin0/phobos-rs/blob/2a1e539611bb3ede5c2d7978300353630c7c553b/src/core/debug.rs#L75-L129
unsafe extern "system" fn vk_debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    msg_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = unsafe { &*p_callback_data };
    let id_name = crate::util::wrap_c_str(callback_data.p_message_id_name);
    let id_name = id_name.to_string_lossy();
    let text = crate::util::wrap_c_str(callback_data.p_message);
    let text = text.to_string_lossy();
    let message = DiagnosticMessage {
        severity,
        kind: msg_type,
        id_name: &id_name,
        id_number: callback_data.message_id_number,
        text: &text,
    };

    if user_data.is_null() {
        TracingSink.receive(&message);
    } else {
        let slot = unsafe { &*(user_data as *const SinkSlot) };
        slot.sink.receive(&message);
    }

    // Never abort the call that triggered the message
    vk::FALSE
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Collecting {
        received: Mutex<Vec<(vk::DebugUtilsMessageSeverityFlagsEXT, String)>>,
    }

    impl DiagnosticSink for Collecting {
        fn receive(&self, message: &DiagnosticMessage<'_>) {
            self.received
                .lock()
                .unwrap()
                .push((message.severity, message.text.to_string()));
        }
    }

    #[test]
    fn create_info_carries_filters_and_slot() {
        let slot = SinkSlot::new(Arc::new(TracingSink));
        let info = messenger_create_info(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
            &slot,
        );
        assert_eq!(
            info.message_severity,
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        );
        assert_eq!(info.message_type, vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION);
        assert_eq!(info.p_user_data as *const SinkSlot, Arc::as_ptr(&slot));
        assert!(info.pfn_user_callback.is_some());
    }

    #[test]
    fn callback_forwards_to_slot() {
        let sink = Arc::new(Collecting::default());
        let slot = SinkSlot::new(sink.clone());
        let text = CString::new("vkCreateDevice: bad queue index").unwrap();
        let data = vk::DebugUtilsMessengerCallbackDataEXT {
            p_message: text.as_ptr(),
            message_id_number: 7,
            ..Default::default()
        };
        let ret = unsafe {
            vk_debug_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                &data,
                slot.user_data(),
            )
        };
        assert_eq!(ret, vk::FALSE);
        let received = sink.received.lock().unwrap();
        assert_eq!(
            *received,
            vec![(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                "vkCreateDevice: bad queue index".to_string()
            )]
        );
    }

    #[test]
    fn callback_tolerates_null_data() {
        let ret = unsafe {
            vk_debug_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL,
                ptr::null(),
                ptr::null_mut(),
            )
        };
        assert_eq!(ret, vk::FALSE);
    }
}
