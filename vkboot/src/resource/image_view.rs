use ash::vk;

use crate::error::{BootError, Result, Stage};
use crate::traits::Destructible;

#[derive(Debug, Clone)]
pub struct ImageView {
	handle: vk::ImageView,
	device: crate::device::LogicalDevice,
}

impl Destructible for ImageView {
	fn destroy(&mut self) {
		#[cfg(feature = "log-lifetimes")]
		tracing::trace!("Destroying VkImageView {:p}", self.handle);

		unsafe {
			self.device
			    .get_handle()
			    .destroy_image_view(self.handle, None);
		}
	}
}

/// A plain 2D color view over the whole of a single-level, single-layer image, with the
/// identity swizzle. What presentable images need.
pub struct ImageViewCreateInfo {
	pub device: crate::device::LogicalDevice,
	pub image: vk::Image,
	pub format: vk::Format,
}

impl ImageViewCreateInfo {
	/// Subresource range covering mip 0 and layer 0 of the color aspect
	pub fn color_subresource_range() -> vk::ImageSubresourceRange {
		vk::ImageSubresourceRange {
			aspect_mask: vk::ImageAspectFlags::COLOR,
			base_mip_level: 0,
			level_count: 1,
			base_array_layer: 0,
			layer_count: 1,
		}
	}

	pub fn color_2d(image: vk::Image, format: vk::Format) -> vk::ImageViewCreateInfo<'static> {
		vk::ImageViewCreateInfo {
			s_type: vk::StructureType::IMAGE_VIEW_CREATE_INFO,
			p_next: std::ptr::null(),
			flags: vk::ImageViewCreateFlags::empty(),
			image,
			view_type: vk::ImageViewType::TYPE_2D,
			format,
			components: vk::ComponentMapping {
				r: vk::ComponentSwizzle::IDENTITY,
				g: vk::ComponentSwizzle::IDENTITY,
				b: vk::ComponentSwizzle::IDENTITY,
				a: vk::ComponentSwizzle::IDENTITY,
			},
			subresource_range: Self::color_subresource_range(),
			_marker: Default::default(),
		}
	}
}

impl ImageView {
	pub fn new(create_info: ImageViewCreateInfo) -> Result<Self> {
		let ImageViewCreateInfo {
			device,
			image,
			format,
		} = create_info;
		let view_ci = ImageViewCreateInfo::color_2d(image, format);
		let handle = unsafe { device.get_handle().create_image_view(&view_ci, None) }
			.map_err(BootError::rejected(Stage::ImageView))?;

		#[cfg(feature = "log-lifetimes")]
		tracing::trace!("Creating VkImageView {:p}", handle);

		Ok(Self { handle, device })
	}

	pub fn get_handle(&self) -> &vk::ImageView {
		&self.handle
	}

	pub fn handle(&self) -> vk::ImageView {
		self.handle
	}

	pub fn get_device(&self) -> &crate::device::LogicalDevice {
		&self.device
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn color_range_is_single_level_single_layer() {
		let range = ImageViewCreateInfo::color_subresource_range();
		assert_eq!(range.aspect_mask, vk::ImageAspectFlags::COLOR);
		assert_eq!((range.base_mip_level, range.level_count), (0, 1));
		assert_eq!((range.base_array_layer, range.layer_count), (0, 1));
	}

	#[test]
	fn color_view_is_2d_with_identity_swizzle() {
		let view_ci = ImageViewCreateInfo::color_2d(vk::Image::null(), vk::Format::B8G8R8A8_SRGB);
		assert_eq!(view_ci.s_type, vk::StructureType::IMAGE_VIEW_CREATE_INFO);
		assert_eq!(view_ci.view_type, vk::ImageViewType::TYPE_2D);
		assert_eq!(view_ci.format, vk::Format::B8G8R8A8_SRGB);
		for swizzle in [
			view_ci.components.r,
			view_ci.components.g,
			view_ci.components.b,
			view_ci.components.a,
		] {
			assert_eq!(swizzle, vk::ComponentSwizzle::IDENTITY);
		}
		assert_eq!(view_ci.subresource_range.level_count, 1);
		assert_eq!(view_ci.subresource_range.layer_count, 1);
	}
}
