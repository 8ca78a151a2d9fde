use std::ops::Deref;

use ash::vk;

use crate::bootstrap::probe::DeviceProbe;
use crate::error::{BootError, Result};

/// A physical device as seen by the selector
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub device: crate::device::PhysicalDevice,
    /// First family, in driver order, with graphics support
    pub graphics_family: Option<u32>,
    /// First family, in driver order, able to present to the surface
    pub present_family: Option<u32>,
}

impl DeviceCandidate {
    /// Reads the device and scans its queue families
    ///
    /// The two scans are independent. Presentation support is queried family by family,
    /// graphics capable or not, until the first family that can present.
    pub fn probe<P: DeviceProbe>(probe: &P, handle: vk::PhysicalDevice) -> Result<Self> {
        let device = crate::device::PhysicalDevice::new(probe, handle);
        let graphics_family = device
            .get_total_queue_families()
            .iter()
            .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
            .map(|index| index as u32);

        let mut present_family = None;
        for index in 0..device.get_total_queue_families().len() as u32 {
            if probe.supports_present(handle, index)? {
                present_family = Some(index);
                break;
            }
        }

        Ok(Self {
            device,
            graphics_family,
            present_family,
        })
    }

    pub fn is_viable(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    pub fn is_discrete(&self) -> bool {
        self.device.is_discrete()
    }

    fn into_selected(self) -> Option<SelectedDevice> {
        Some(SelectedDevice {
            graphics_family: self.graphics_family?,
            present_family: self.present_family?,
            device: self.device,
        })
    }
}

/// The device the pipeline runs on. Both families are known.
#[derive(Debug, Clone)]
pub struct SelectedDevice {
    pub device: crate::device::PhysicalDevice,
    pub graphics_family: u32,
    pub present_family: u32,
}

impl SelectedDevice {
    pub fn families_coincide(&self) -> bool {
        self.graphics_family == self.present_family
    }

    /// Distinct queue families, ascending
    pub fn distinct_families(&self) -> Vec<u32> {
        let mut families = vec![self.graphics_family, self.present_family];
        families.sort_unstable();
        families.dedup();
        families
    }
}

impl Deref for SelectedDevice {
    type Target = crate::device::PhysicalDevice;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

/// Picks from candidates in enumeration order
///
/// The first viable candidate is taken. While that choice is not discrete, the first later
/// viable discrete candidate replaces it; once a discrete candidate is chosen the choice is
/// final.
pub fn choose_candidate(candidates: Vec<DeviceCandidate>) -> Option<SelectedDevice> {
    let mut chosen: Option<DeviceCandidate> = None;
    for candidate in candidates.into_iter().filter(DeviceCandidate::is_viable) {
        let replace = match &chosen {
            None => true,
            Some(current) => !current.is_discrete() && candidate.is_discrete(),
        };
        if replace {
            chosen = Some(candidate);
        }
    }
    chosen.and_then(DeviceCandidate::into_selected)
}

/// Selects the physical device to run on
#[derive(Debug, Default, Clone, Copy)]
pub struct PhysicalDeviceSelector;

impl PhysicalDeviceSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select<P: DeviceProbe>(&self, probe: &P) -> Result<SelectedDevice> {
        let candidates = probe
            .physical_devices()?
            .into_iter()
            .map(|handle| DeviceCandidate::probe(probe, handle))
            .collect::<Result<Vec<_>>>()?;

        for candidate in candidates.iter() {
            tracing::debug!(
                "Candidate {:?}: graphics family {:?}, present family {:?}, discrete {}",
                candidate.device.name(),
                candidate.graphics_family,
                candidate.present_family,
                candidate.is_discrete()
            );
        }

        let selected = choose_candidate(candidates).ok_or(BootError::NoSuitableDevice)?;
        tracing::info!(
            "Selected physical device {:?} (graphics family {}, present family {}, discrete {})",
            selected.device.name(),
            selected.graphics_family,
            selected.present_family,
            selected.device.is_discrete()
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::tests::{family, mock_device, MockDriver};

    const GRAPHICS: vk::QueueFlags = vk::QueueFlags::GRAPHICS;
    const COMPUTE: vk::QueueFlags = vk::QueueFlags::COMPUTE;
    const DISCRETE: vk::PhysicalDeviceType = vk::PhysicalDeviceType::DISCRETE_GPU;
    const INTEGRATED: vk::PhysicalDeviceType = vk::PhysicalDeviceType::INTEGRATED_GPU;

    fn name_of(selected: &SelectedDevice) -> String {
        selected.device.name().into_string().unwrap()
    }

    #[test]
    fn first_discrete_viable_wins() {
        let driver = MockDriver::with_devices(vec![
            mock_device("integrated", INTEGRATED, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("discrete a", DISCRETE, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("discrete b", DISCRETE, vec![family(GRAPHICS, 1)], vec![true]),
        ]);
        let selected = PhysicalDeviceSelector::new().select(&driver).unwrap();
        assert_eq!(name_of(&selected), "discrete a");
        assert_eq!(selected.device.handle(), MockDriver::handle(1));
    }

    #[test]
    fn falls_back_to_first_viable() {
        let driver = MockDriver::with_devices(vec![
            mock_device("no graphics", DISCRETE, vec![family(COMPUTE, 1)], vec![true]),
            mock_device("integrated a", INTEGRATED, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("integrated b", INTEGRATED, vec![family(GRAPHICS, 1)], vec![true]),
        ]);
        let selected = PhysicalDeviceSelector::new().select(&driver).unwrap();
        assert_eq!(name_of(&selected), "integrated a");
    }

    #[test]
    fn non_viable_discrete_is_skipped() {
        let driver = MockDriver::with_devices(vec![
            mock_device("integrated", INTEGRATED, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("headless", DISCRETE, vec![family(GRAPHICS, 1)], vec![false]),
        ]);
        let selected = PhysicalDeviceSelector::new().select(&driver).unwrap();
        assert_eq!(name_of(&selected), "integrated");
    }

    #[test]
    fn scans_are_independent() {
        // Family 0 presents but cannot draw, family 1 draws but cannot present
        let driver = MockDriver::with_devices(vec![mock_device(
            "split",
            INTEGRATED,
            vec![family(COMPUTE, 1), family(GRAPHICS, 1)],
            vec![true, false],
        )]);
        let selected = PhysicalDeviceSelector::new().select(&driver).unwrap();
        assert_eq!(selected.graphics_family, 1);
        assert_eq!(selected.present_family, 0);
        assert!(!selected.families_coincide());
        assert_eq!(selected.distinct_families(), vec![0, 1]);
        assert_eq!(driver.count("supports_present"), 1);
    }

    #[test]
    fn first_graphics_family_is_taken() {
        let driver = MockDriver::with_devices(vec![mock_device(
            "gpu",
            DISCRETE,
            vec![family(COMPUTE, 2), family(GRAPHICS | COMPUTE, 4), family(GRAPHICS, 1)],
            vec![false, false, true],
        )]);
        let selected = PhysicalDeviceSelector::new().select(&driver).unwrap();
        assert_eq!(selected.graphics_family, 1);
        assert_eq!(selected.present_family, 2);
        assert_eq!(selected.distinct_families(), vec![1, 2]);
    }

    #[test]
    fn coinciding_families_collapse() {
        let driver = MockDriver::with_devices(vec![mock_device(
            "gpu",
            DISCRETE,
            vec![family(GRAPHICS, 1)],
            vec![true],
        )]);
        let selected = PhysicalDeviceSelector::new().select(&driver).unwrap();
        assert!(selected.families_coincide());
        assert_eq!(selected.distinct_families(), vec![0]);
    }

    #[test]
    fn zero_queue_families_is_not_viable() {
        let driver = MockDriver::with_devices(vec![mock_device("empty", DISCRETE, vec![], vec![])]);
        let candidate = DeviceCandidate::probe(&driver, MockDriver::handle(0)).unwrap();
        assert!(!candidate.is_viable());
        assert_eq!(driver.count("supports_present"), 0);
    }

    #[test]
    fn no_viable_device_stops_the_pipeline() {
        let driver = MockDriver::with_devices(vec![
            mock_device("no present", DISCRETE, vec![family(GRAPHICS, 1)], vec![false]),
            mock_device("no graphics", INTEGRATED, vec![family(COMPUTE, 1)], vec![true]),
        ]);
        let err = PhysicalDeviceSelector::new().select(&driver).unwrap_err();
        assert!(matches!(err, BootError::NoSuitableDevice));
        assert_eq!(err.kind(), crate::ErrorKind::Negotiation);
        assert_eq!(driver.count("capabilities"), 0);
        assert_eq!(driver.count("formats"), 0);
        assert_eq!(driver.count("present_modes"), 0);
    }

    #[test]
    fn no_devices_at_all() {
        let driver = MockDriver::default();
        assert!(matches!(
            PhysicalDeviceSelector::new().select(&driver),
            Err(BootError::NoSuitableDevice)
        ));
        assert_eq!(driver.calls(), vec!["physical_devices"]);
    }

    #[test]
    fn choose_candidate_keeps_first_discrete() {
        let driver = MockDriver::with_devices(vec![
            mock_device("cpu", vk::PhysicalDeviceType::CPU, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("discrete a", DISCRETE, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("integrated", INTEGRATED, vec![family(GRAPHICS, 1)], vec![true]),
            mock_device("discrete b", DISCRETE, vec![family(GRAPHICS, 1)], vec![true]),
        ]);
        let candidates = (0..4)
            .map(|index| DeviceCandidate::probe(&driver, MockDriver::handle(index)).unwrap())
            .collect();
        let selected = choose_candidate(candidates).unwrap();
        assert_eq!(name_of(&selected), "discrete a");
    }
}
