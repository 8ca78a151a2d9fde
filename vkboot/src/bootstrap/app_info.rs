use std::ffi::CString;
use std::sync::Arc;

use ash::vk;
use derivative::Derivative;

use crate::device::{DiagnosticSink, TracingSink};

/// Khronos validation layer, requested by default when validation is enabled
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Packs a (major, minor, patch) triple the way the driver expects it
pub fn make_version(version: (u32, u32, u32)) -> u32 {
    vk::make_api_version(0, version.0, version.1, version.2)
}

/// What the diagnostic channel listens to and where messages go
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct DiagnosticSettings {
    /// Layers that must be present for the instance to be created
    pub layers: Vec<String>,
    pub severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub kinds: vk::DebugUtilsMessageTypeFlagsEXT,
    #[derivative(Debug = "ignore")]
    pub sink: Arc<dyn DiagnosticSink>,
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        Self {
            layers: vec![VALIDATION_LAYER.to_string()],
            severities: vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            kinds: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            sink: Arc::new(TracingSink),
        }
    }
}

impl DiagnosticSettings {
    pub fn layer_names(&self) -> crate::Result<Vec<CString>> {
        self.layers
            .iter()
            .map(|layer| CString::new(layer.as_str()).map_err(crate::BootError::from))
            .collect()
    }
}

/// Everything the bootstrap needs to know up front
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Name of application
    pub name: String,
    /// Application version, (major, minor, patch)
    pub version: (u32, u32, u32),
    /// Name of engine
    pub engine_name: Option<String>,
    /// Version of engine
    pub engine_version: (u32, u32, u32),
    /// Api version
    pub api_version: (u32, u32, u32),
    /// Enable validation layers and the diagnostic channel
    pub enable_validation: bool,
    pub diagnostics: DiagnosticSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: String::from("vulkan-demo"),
            version: (0, 0, 1),
            engine_name: None,
            engine_version: (0, 0, 0),
            api_version: (1, 0, 0),
            enable_validation: false,
            diagnostics: DiagnosticSettings::default(),
        }
    }
}
