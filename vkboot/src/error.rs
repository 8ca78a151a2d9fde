use std::ffi::NulError;
use std::fmt;

use ash::vk;
/// Possible errors
use thiserror::Error;

/// Pipeline stage a driver call belongs to
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Instance,
    DiagnosticChannel,
    Surface,
    DeviceSelection,
    LogicalDevice,
    Swapchain,
    ImageView,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Instance => "instance creation",
            Stage::DiagnosticChannel => "diagnostic channel setup",
            Stage::Surface => "surface binding",
            Stage::DeviceSelection => "physical device selection",
            Stage::LogicalDevice => "logical device creation",
            Stage::Swapchain => "swapchain creation",
            Stage::ImageView => "image view creation",
        };
        f.write_str(name)
    }
}

/// Broad class of a [`BootError`]
///
/// Every class is fatal for the bootstrap; the class only tells the operator where to look.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested setup cannot be satisfied by this environment
    Configuration,
    /// The driver returned a non-success status
    DriverRejection,
    /// The driver answered, but no valid choice exists
    Negotiation,
}

#[derive(Debug, Error)]
pub enum BootError {
    #[error("Unable to load the Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("Failed to find validation layer: {0}")]
    MissingLayer(String),

    #[error("Vulkan extension entry point {0} not found")]
    UnresolvedEntryPoint(String),

    #[error("String contains null byte")]
    StringContainsNull(#[from] NulError),

    #[error("Window handle is unavailable: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("Driver rejected {stage}: {result}")]
    Rejected { stage: Stage, result: vk::Result },

    #[error("Driver query {query} failed: {result}")]
    Query {
        query: &'static str,
        result: vk::Result,
    },

    #[error("No physical device offers both a graphics queue family and a queue family presenting to the surface")]
    NoSuitableDevice,

    #[error("Surface reports no supported formats")]
    NoSurfaceFormats,

    #[error("Surface reports no supported present modes")]
    NoPresentModes,

    #[error("Surface extent is undefined; the caller would have to pick one")]
    UndefinedExtent,
}

impl BootError {
    /// Wraps a [`vk::Result`] from a creation call made during `stage`
    pub fn rejected(stage: Stage) -> impl FnOnce(vk::Result) -> Self {
        move |result| BootError::Rejected { stage, result }
    }

    /// Wraps a [`vk::Result`] from a read-only query
    pub fn query(query: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| BootError::Query { query, result }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BootError::Loading(_)
            | BootError::MissingLayer(_)
            | BootError::UnresolvedEntryPoint(_)
            | BootError::StringContainsNull(_)
            | BootError::WindowHandle(_) => ErrorKind::Configuration,
            BootError::Rejected { .. } | BootError::Query { .. } => ErrorKind::DriverRejection,
            BootError::NoSuitableDevice
            | BootError::NoSurfaceFormats
            | BootError::NoPresentModes
            | BootError::UndefinedExtent => ErrorKind::Negotiation,
        }
    }

    /// Stage the error was raised in, when it maps to exactly one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BootError::Loading(_) | BootError::MissingLayer(_) => Some(Stage::Instance),
            BootError::Rejected { stage, .. } => Some(*stage),
            BootError::NoSuitableDevice => Some(Stage::DeviceSelection),
            BootError::NoSurfaceFormats
            | BootError::NoPresentModes
            | BootError::UndefinedExtent => Some(Stage::Swapchain),
            _ => None,
        }
    }
}

pub type Result<T, E = BootError> = std::result::Result<T, E>;
