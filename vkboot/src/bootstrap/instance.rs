use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr;
use std::sync::Arc;

use ash::vk;
use derivative::Derivative;

use crate::bootstrap::app_info::{make_version, AppSettings};
use crate::bootstrap::probe::LayerProbe;
use crate::device::debug_utils::{messenger_create_info, SinkSlot};
use crate::device::{DiagnosticSink, TracingSink};
use crate::error::{BootError, Result};

/// Quickly builds an Instance
///
/// Building happens in two steps. [`InstanceBuilder::plan`] checks the requested layers against
/// the driver and settles the final extension and layer lists; only the resulting
/// [`InstancePlan`] can create an instance.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct InstanceBuilder {
    application_name: String,
    application_version: (u32, u32, u32),
    engine_name: Option<String>,
    engine_version: (u32, u32, u32),
    /// Vulkan version used
    ///
    /// In the form of (major, minor, patch)
    vulkan_version: (u32, u32, u32),
    /// All instance level extensions used, in insertion order
    extensions: Vec<CString>,
    /// Layers required when validating
    layers: Vec<CString>,
    /// Whether to enable validation
    validate: bool,
    severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    kinds: vk::DebugUtilsMessageTypeFlagsEXT,
    #[derivative(Debug = "ignore")]
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self {
            application_name: String::new(),
            application_version: (0, 0, 0),
            engine_name: None,
            engine_version: (0, 0, 0),
            vulkan_version: (1, 0, 0),
            extensions: Vec::new(),
            layers: Vec::new(),
            validate: false,
            severities: vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            kinds: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            sink: Arc::new(TracingSink),
        }
    }

    /// Takes identity, validation and diagnostic filters from `settings`
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        let mut builder = Self::new()
            .set_application_info(&settings.name, settings.version)
            .set_vulkan_version(settings.api_version)
            .set_validation(settings.enable_validation)
            .set_diagnostics(
                settings.diagnostics.severities,
                settings.diagnostics.kinds,
                settings.diagnostics.sink.clone(),
            );
        if let Some(engine_name) = settings.engine_name.as_deref() {
            builder = builder.set_engine_info(engine_name, settings.engine_version);
        } else {
            builder.engine_version = settings.engine_version;
        }
        if settings.enable_validation {
            for layer in settings.diagnostics.layer_names()? {
                builder = builder.add_layer(&layer);
            }
        }
        Ok(builder)
    }

    /// Enables validation
    pub fn set_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set vulkan version
    pub fn set_vulkan_version(mut self, version: (u32, u32, u32)) -> Self {
        assert!(
            version.0 <= 0b1111111,
            "Major version must be a 7-bit integer"
        );
        assert!(
            version.1 <= 0b1111111111,
            "Minor version must be a 10-bit integer"
        );
        assert!(
            version.2 <= 0b111111111111,
            "Patch version must be a 12-bit integer"
        );
        self.vulkan_version = version;
        self
    }

    /// Set app name and version
    ///
    /// Version in the form of (major, minor, patch)
    pub fn set_application_info(mut self, name: &str, version: (u32, u32, u32)) -> Self {
        self.application_name = name.to_string();
        self.application_version = version;
        self
    }

    pub fn set_engine_info(mut self, name: &str, version: (u32, u32, u32)) -> Self {
        self.engine_name = Some(name.to_string());
        self.engine_version = version;
        self
    }

    /// Filters and receiver for driver messages, used only when validating
    pub fn set_diagnostics(
        mut self,
        severities: vk::DebugUtilsMessageSeverityFlagsEXT,
        kinds: vk::DebugUtilsMessageTypeFlagsEXT,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        self.severities = severities;
        self.kinds = kinds;
        self.sink = sink;
        self
    }

    /// Adds an extension. Duplicates are dropped, first occurrence wins.
    pub fn add_extension(mut self, name: *const c_char) -> Self {
        let name = crate::util::wrap_c_str(name);
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
        self
    }

    pub fn add_extensions(self, names: &[*const c_char]) -> Self {
        names
            .iter()
            .fold(self, |builder, &name| builder.add_extension(name))
    }

    /// Adds a layer that validation requires
    pub fn add_layer(mut self, name: &CStr) -> Self {
        if !self.layers.iter().any(|layer| layer.as_c_str() == name) {
            self.layers.push(name.to_owned());
        }
        self
    }

    /// Settles the extension and layer lists
    ///
    /// Layers are only queried when validation is on and at least one layer is requested. Every
    /// requested layer must then appear, exactly, in what `probe` reports.
    pub fn plan<P: LayerProbe>(self, probe: &P) -> Result<InstancePlan> {
        let mut builder = self;
        let (layers, diagnostics) = if builder.validate {
            if !builder.layers.is_empty() {
                let available = probe.instance_layers()?;
                if let Some(missing) = builder
                    .layers
                    .iter()
                    .find(|layer| !available.contains(layer))
                {
                    return Err(BootError::MissingLayer(
                        missing.to_string_lossy().into_owned(),
                    ));
                }
            }
            builder = builder.add_extension(ash::ext::debug_utils::NAME.as_ptr());
            (
                std::mem::take(&mut builder.layers),
                Some(DiagnosticPlan {
                    severities: builder.severities,
                    kinds: builder.kinds,
                    sink: builder.sink.clone(),
                }),
            )
        } else {
            (Vec::new(), None)
        };

        tracing::debug!(
            "Instance plan: extensions {:?}, layers {:?}",
            builder.extensions,
            layers
        );

        Ok(InstancePlan {
            application_name: CString::new(builder.application_name)?,
            application_version: make_version(builder.application_version),
            engine_name: builder.engine_name.map(CString::new).transpose()?,
            engine_version: make_version(builder.engine_version),
            api_version: make_version(builder.vulkan_version),
            extensions: builder.extensions,
            layers,
            diagnostics,
        })
    }

    /// Loads the system Vulkan library, plans against it and creates the instance
    pub fn build(self) -> Result<crate::core::Instance> {
        let entry = unsafe { ash::Entry::load() }?;
        self.plan(&entry)?.create(entry)
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
struct DiagnosticPlan {
    severities: vk::DebugUtilsMessageSeverityFlagsEXT,
    kinds: vk::DebugUtilsMessageTypeFlagsEXT,
    #[derivative(Debug = "ignore")]
    sink: Arc<dyn DiagnosticSink>,
}

/// Validated instance configuration
#[derive(Debug, Clone)]
pub struct InstancePlan {
    application_name: CString,
    application_version: u32,
    engine_name: Option<CString>,
    engine_version: u32,
    api_version: u32,
    extensions: Vec<CString>,
    layers: Vec<CString>,
    diagnostics: Option<DiagnosticPlan>,
}

impl InstancePlan {
    pub fn extensions(&self) -> &[CString] {
        &self.extensions
    }

    pub fn layers(&self) -> &[CString] {
        &self.layers
    }

    /// Whether a diagnostic channel will be attached
    pub fn is_instrumented(&self) -> bool {
        self.diagnostics.is_some()
    }

    pub fn create(self, entry: ash::Entry) -> Result<crate::core::Instance> {
        let slot = self
            .diagnostics
            .as_ref()
            .map(|diagnostics| SinkSlot::new(diagnostics.sink.clone()));
        // Chained so instance creation and destruction are reported as well
        let debug_ci = self
            .diagnostics
            .as_ref()
            .zip(slot.as_ref())
            .map(|(diagnostics, slot)| {
                messenger_create_info(diagnostics.severities, diagnostics.kinds, slot)
            });

        let app_info = vk::ApplicationInfo {
            s_type: vk::StructureType::APPLICATION_INFO,
            p_next: ptr::null(),
            p_application_name: self.application_name.as_ptr(),
            application_version: self.application_version,
            p_engine_name: self
                .engine_name
                .as_ref()
                .map_or(ptr::null(), |name| name.as_ptr()),
            engine_version: self.engine_version,
            api_version: self.api_version,
            _marker: Default::default(),
        };
        let ext_cptrs: Vec<*const c_char> =
            self.extensions.iter().map(|name| name.as_ptr()).collect();
        let layer_cptrs: Vec<*const c_char> =
            self.layers.iter().map(|name| name.as_ptr()).collect();

        let instance_ci = vk::InstanceCreateInfo {
            s_type: vk::StructureType::INSTANCE_CREATE_INFO,
            p_next: debug_ci.as_ref().map_or(ptr::null(), |debug_ci| {
                debug_ci as *const vk::DebugUtilsMessengerCreateInfoEXT as *const c_void
            }),
            flags: vk::InstanceCreateFlags::empty(),
            p_application_info: &app_info,
            enabled_layer_count: layer_cptrs.len() as u32,
            pp_enabled_layer_names: layer_cptrs.as_ptr(),
            enabled_extension_count: ext_cptrs.len() as u32,
            pp_enabled_extension_names: ext_cptrs.as_ptr(),
            _marker: Default::default(),
        };

        let instance =
            crate::core::Instance::new(entry, &instance_ci, self.extensions, self.layers, slot)?;
        tracing::info!(
            "Created instance with {} extension(s) and {} layer(s)",
            instance.enabled_extensions().len(),
            instance.enabled_layers().len()
        );
        Ok(instance)
    }
}
