use std::ffi::c_char;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// Describes a window we can present to
pub trait PresentableWindow: WindowDimensions + HasWindowHandle + HasDisplayHandle + Sized {}

pub trait WindowDimensions {
    /// Window width
    fn width(&self) -> u32;
    /// Window height
    fn height(&self) -> u32;
}

/// Instance extensions the windowing layer needs before a surface can be bound to `window`
pub fn required_extensions<T: HasDisplayHandle>(
    window: &T,
) -> crate::Result<&'static [*const c_char]> {
    let display_handle = window.display_handle()?.as_raw();
    ash_window::enumerate_required_extensions(display_handle)
        .map_err(crate::BootError::query("required surface extensions"))
}

#[cfg(feature = "winit")]
impl WindowDimensions for winit::window::Window {
    fn width(&self) -> u32 {
        self.inner_size().width
    }

    fn height(&self) -> u32 {
        self.inner_size().height
    }
}
#[cfg(feature = "winit")]
impl PresentableWindow for winit::window::Window {}
