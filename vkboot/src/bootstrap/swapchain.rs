use std::ptr;

use ash::vk;

use crate::bootstrap::init::Teardown;
use crate::bootstrap::physical_device::SelectedDevice;
use crate::bootstrap::probe::SurfaceProbe;
use crate::error::{BootError, Result, Stage};
use crate::resource::{ImageView, ImageViewCreateInfo};

/// Format and color space picked whenever the surface offers them
pub const PREFERRED_SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_SRGB,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// What the surface supports for one physical device
#[derive(Debug, Clone)]
pub struct SurfaceNegotiation {
    capabilities: vk::SurfaceCapabilitiesKHR,
    formats: Vec<vk::SurfaceFormatKHR>,
    present_modes: Vec<vk::PresentModeKHR>,
}

/// How swapchain images are shared between the graphics and presentation families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSharing {
    Exclusive,
    /// Graphics family, then presentation family
    Concurrent([u32; 2]),
}

impl ImageSharing {
    pub fn between(graphics_family: u32, present_family: u32) -> Self {
        if graphics_family == present_family {
            ImageSharing::Exclusive
        } else {
            ImageSharing::Concurrent([graphics_family, present_family])
        }
    }

    pub fn mode(&self) -> vk::SharingMode {
        match self {
            ImageSharing::Exclusive => vk::SharingMode::EXCLUSIVE,
            ImageSharing::Concurrent(_) => vk::SharingMode::CONCURRENT,
        }
    }

    /// Families named in the create info, empty when exclusive
    pub fn family_indices(&self) -> &[u32] {
        match self {
            ImageSharing::Exclusive => &[],
            ImageSharing::Concurrent(families) => families,
        }
    }
}

/// Result of negotiation, everything needed to create the swapchain
#[derive(Debug, Clone, Copy)]
pub struct SwapchainPlan {
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub sharing: ImageSharing,
}

impl SurfaceNegotiation {
    /// Fails when the surface reports no formats or no present modes
    pub fn new(
        capabilities: vk::SurfaceCapabilitiesKHR,
        formats: Vec<vk::SurfaceFormatKHR>,
        present_modes: Vec<vk::PresentModeKHR>,
    ) -> Result<Self> {
        if formats.is_empty() {
            return Err(BootError::NoSurfaceFormats);
        }
        if present_modes.is_empty() {
            return Err(BootError::NoPresentModes);
        }
        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    pub fn query<P: SurfaceProbe>(probe: &P, device: vk::PhysicalDevice) -> Result<Self> {
        let capabilities = probe.capabilities(device)?;
        let formats = probe.formats(device)?;
        let present_modes = probe.present_modes(device)?;
        Self::new(capabilities, formats, present_modes)
    }

    pub fn capabilities(&self) -> &vk::SurfaceCapabilitiesKHR {
        &self.capabilities
    }

    pub fn formats(&self) -> &[vk::SurfaceFormatKHR] {
        &self.formats
    }

    pub fn present_modes(&self) -> &[vk::PresentModeKHR] {
        &self.present_modes
    }

    /// The preferred pair if listed anywhere, otherwise the first listed pair
    pub fn choose_format(&self) -> vk::SurfaceFormatKHR {
        let mut chosen = self.formats[0];
        for surface_format in self.formats.iter() {
            if surface_format.format == PREFERRED_SURFACE_FORMAT.format
                && surface_format.color_space == PREFERRED_SURFACE_FORMAT.color_space
            {
                chosen = *surface_format;
                break;
            }
        }
        chosen
    }

    /// Always FIFO, the one mode every presentation engine supports
    pub fn choose_present_mode(&self) -> vk::PresentModeKHR {
        if !self.present_modes.contains(&vk::PresentModeKHR::FIFO) {
            tracing::warn!(
                "Surface does not list FIFO among {:?}, using it anyway",
                self.present_modes
            );
        }
        vk::PresentModeKHR::FIFO
    }

    pub fn choose_extent(&self) -> Result<vk::Extent2D> {
        if self.capabilities.current_extent.width == u32::MAX {
            return Err(BootError::UndefinedExtent);
        }
        Ok(self.capabilities.current_extent)
    }

    /// One more than the minimum, capped at the maximum when there is one
    pub fn choose_image_count(&self) -> u32 {
        let count = self.capabilities.min_image_count + 1;
        if self.capabilities.max_image_count != 0 && count > self.capabilities.max_image_count {
            self.capabilities.max_image_count
        } else {
            count
        }
    }

    pub fn negotiate(&self, selected: &SelectedDevice) -> Result<SwapchainPlan> {
        let plan = SwapchainPlan {
            format: self.choose_format(),
            present_mode: self.choose_present_mode(),
            extent: self.choose_extent()?,
            image_count: self.choose_image_count(),
            pre_transform: self.capabilities.current_transform,
            sharing: ImageSharing::between(selected.graphics_family, selected.present_family),
        };
        tracing::debug!(
            "Negotiated format {:?}/{:?}, present mode {:?}, extent {}x{}, {} image(s), {:?}",
            plan.format.format,
            plan.format.color_space,
            plan.present_mode,
            plan.extent.width,
            plan.extent.height,
            plan.image_count,
            plan.sharing
        );
        Ok(plan)
    }
}

/// Creates the swapchain and a view for each of its images from a [`SwapchainPlan`]
pub struct SwapchainBuilder<'a> {
    plan: &'a SwapchainPlan,
    surface: &'a crate::wsi::Surface,
}

impl<'a> SwapchainBuilder<'a> {
    pub fn new(plan: &'a SwapchainPlan, surface: &'a crate::wsi::Surface) -> Self {
        Self { plan, surface }
    }

    /// Every created object is recorded on `teardown` right after its creation
    pub fn build(
        self,
        functions: &crate::core::DeviceFunctions,
        device: crate::device::LogicalDevice,
        teardown: &mut Teardown,
    ) -> Result<(crate::wsi::Swapchain, Vec<ImageView>)> {
        let plan = self.plan;
        let families = plan.sharing.family_indices();
        let swapchain_ci = vk::SwapchainCreateInfoKHR {
            s_type: vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
            p_next: ptr::null(),
            flags: vk::SwapchainCreateFlagsKHR::empty(),
            surface: self.surface.handle(),
            min_image_count: plan.image_count,
            image_format: plan.format.format,
            image_color_space: plan.format.color_space,
            image_extent: plan.extent,
            image_array_layers: 1,
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            image_sharing_mode: plan.sharing.mode(),
            queue_family_index_count: families.len() as u32,
            p_queue_family_indices: if families.is_empty() {
                ptr::null()
            } else {
                families.as_ptr()
            },
            pre_transform: plan.pre_transform,
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            present_mode: plan.present_mode,
            clipped: vk::TRUE,
            old_swapchain: vk::SwapchainKHR::null(),
            _marker: Default::default(),
        };
        let swapchain = crate::wsi::Swapchain::new(functions, device.clone(), &swapchain_ci)?;
        teardown.record(Stage::Swapchain, &swapchain);

        let images = swapchain.get_images()?;
        let mut views = Vec::with_capacity(images.len());
        for image in images {
            let view = ImageView::new(ImageViewCreateInfo {
                device: device.clone(),
                image,
                format: plan.format.format,
            })?;
            teardown.record(Stage::ImageView, &view);
            views.push(view);
        }

        tracing::info!(
            "Created swapchain with {} image(s) of {:?} at {}x{}",
            views.len(),
            plan.format.format,
            plan.extent.width,
            plan.extent.height
        );
        Ok((swapchain, views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::tests::{capabilities, family, mock_device, surface_format, MockDriver};

    const SRGB: vk::ColorSpaceKHR = vk::ColorSpaceKHR::SRGB_NONLINEAR;

    fn selected(graphics_family: u32, present_family: u32) -> SelectedDevice {
        let driver = MockDriver::with_devices(vec![mock_device(
            "gpu",
            vk::PhysicalDeviceType::DISCRETE_GPU,
            vec![family(vk::QueueFlags::GRAPHICS, 1); 2],
            vec![true; 2],
        )]);
        SelectedDevice {
            device: crate::device::PhysicalDevice::new(&driver, MockDriver::handle(0)),
            graphics_family,
            present_family,
        }
    }

    fn negotiation(
        formats: Vec<vk::SurfaceFormatKHR>,
        min_image_count: u32,
        max_image_count: u32,
    ) -> SurfaceNegotiation {
        SurfaceNegotiation::new(
            capabilities(min_image_count, max_image_count),
            formats,
            vec![vk::PresentModeKHR::FIFO],
        )
        .unwrap()
    }

    #[test]
    fn single_format_is_used() {
        let negotiation = negotiation(vec![surface_format(vk::Format::R8G8B8A8_SRGB, SRGB)], 2, 3);
        let plan = negotiation.negotiate(&selected(0, 0)).unwrap();
        assert_eq!(plan.format.format, vk::Format::R8G8B8A8_SRGB);
        assert_eq!(plan.format.color_space, SRGB);
        assert_eq!(plan.present_mode, vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn preferred_format_found_later_wins() {
        let negotiation = negotiation(
            vec![
                surface_format(vk::Format::R8G8B8A8_SRGB, SRGB),
                surface_format(vk::Format::B8G8R8A8_SRGB, SRGB),
            ],
            2,
            3,
        );
        let chosen = negotiation.choose_format();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(chosen.color_space, SRGB);
    }

    #[test]
    fn preferred_format_needs_matching_color_space() {
        let negotiation = negotiation(
            vec![
                surface_format(vk::Format::R8G8B8A8_UNORM, SRGB),
                surface_format(
                    vk::Format::B8G8R8A8_SRGB,
                    vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT,
                ),
            ],
            2,
            0,
        );
        assert_eq!(negotiation.choose_format().format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn format_choice_is_idempotent() {
        let negotiation = negotiation(
            vec![
                surface_format(vk::Format::R8G8B8A8_UNORM, SRGB),
                surface_format(vk::Format::B8G8R8A8_SRGB, SRGB),
                surface_format(vk::Format::R16G16B16A16_SFLOAT, SRGB),
            ],
            2,
            0,
        );
        let first = negotiation.choose_format();
        let second = negotiation.choose_format();
        assert_eq!(first.format, second.format);
        assert_eq!(first.color_space, second.color_space);
    }

    #[test]
    fn image_count_bounds() {
        let formats = || vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)];
        assert_eq!(negotiation(formats(), 2, 2).choose_image_count(), 2);
        assert_eq!(negotiation(formats(), 2, 8).choose_image_count(), 3);
        // No maximum
        assert_eq!(negotiation(formats(), 3, 0).choose_image_count(), 4);
        for (min, max) in [(1, 1), (1, 2), (2, 3), (3, 3), (4, 16)] {
            let count = negotiation(formats(), min, max).choose_image_count();
            assert!(count >= min && count <= max, "{count} outside [{min}, {max}]");
        }
    }

    #[test]
    fn present_mode_is_fifo_even_when_unlisted() {
        let negotiation = SurfaceNegotiation::new(
            capabilities(2, 0),
            vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)],
            vec![vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE],
        )
        .unwrap();
        assert_eq!(negotiation.choose_present_mode(), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn undefined_extent_is_fatal() {
        let mut caps = capabilities(2, 3);
        caps.current_extent = vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        };
        let negotiation = SurfaceNegotiation::new(
            caps,
            vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)],
            vec![vk::PresentModeKHR::FIFO],
        )
        .unwrap();
        assert!(matches!(
            negotiation.negotiate(&selected(0, 0)),
            Err(BootError::UndefinedExtent)
        ));
    }

    #[test]
    fn extent_follows_surface() {
        let negotiation = negotiation(vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)], 2, 3);
        let extent = negotiation.choose_extent().unwrap();
        assert_eq!((extent.width, extent.height), (800, 600));
    }

    #[test]
    fn empty_lists_are_rejected() {
        assert!(matches!(
            SurfaceNegotiation::new(capabilities(2, 3), vec![], vec![vk::PresentModeKHR::FIFO]),
            Err(BootError::NoSurfaceFormats)
        ));
        assert!(matches!(
            SurfaceNegotiation::new(
                capabilities(2, 3),
                vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)],
                vec![]
            ),
            Err(BootError::NoPresentModes)
        ));
    }

    #[test]
    fn sharing_follows_families() {
        let negotiation = negotiation(vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)], 2, 3);

        let exclusive = negotiation.negotiate(&selected(1, 1)).unwrap();
        assert_eq!(exclusive.sharing, ImageSharing::Exclusive);
        assert_eq!(exclusive.sharing.mode(), vk::SharingMode::EXCLUSIVE);
        assert!(exclusive.sharing.family_indices().is_empty());

        let concurrent = negotiation.negotiate(&selected(1, 0)).unwrap();
        assert_eq!(concurrent.sharing.mode(), vk::SharingMode::CONCURRENT);
        assert_eq!(concurrent.sharing.family_indices(), &[1, 0]);
    }

    #[test]
    fn query_reads_the_probe() {
        let driver = MockDriver {
            capabilities: capabilities(2, 2),
            formats: vec![surface_format(vk::Format::B8G8R8A8_SRGB, SRGB)],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            ..Default::default()
        };
        let negotiation = SurfaceNegotiation::query(&driver, MockDriver::handle(0)).unwrap();
        assert_eq!(negotiation.choose_image_count(), 2);
        assert_eq!(driver.calls(), vec!["capabilities", "formats", "present_modes"]);
    }
}
