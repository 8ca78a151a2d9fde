use derivative::Derivative;

use crate::bootstrap::app_info::AppSettings;
use crate::bootstrap::instance::InstanceBuilder;
use crate::bootstrap::logical_device::LogicalDeviceBuilder;
use crate::bootstrap::physical_device::{PhysicalDeviceSelector, SelectedDevice};
use crate::bootstrap::probe::PresentationProbe;
use crate::bootstrap::swapchain::{SurfaceNegotiation, SwapchainBuilder, SwapchainPlan};
use crate::core::{DeviceFunctions, Instance, InstanceFunctions};
use crate::device::{DebugMessenger, LogicalDevice, QueueHandles};
use crate::error::Stage;
use crate::resource::ImageView;
use crate::traits::Destructible;
use crate::util::DeletionStack;
use crate::wsi::{PresentableWindow, Surface, Swapchain};

/// Stages that create a releasable resource, in creation order
pub const CREATION_ORDER: [Stage; 6] = [
    Stage::Instance,
    Stage::DiagnosticChannel,
    Stage::Surface,
    Stage::LogicalDevice,
    Stage::Swapchain,
    Stage::ImageView,
];

fn creation_rank(stage: Stage) -> usize {
    CREATION_ORDER
        .iter()
        .position(|ordered| *ordered == stage)
        .unwrap_or(CREATION_ORDER.len())
}

/// [`DeletionStack`] that remembers which stage created each entry
///
/// Entries must be recorded in [`CREATION_ORDER`]; several entries may share a stage.
#[derive(Default)]
pub struct Teardown {
    stack: DeletionStack<'static>,
    stages: Vec<Stage>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `resource` right after `stage` created it
    pub fn record<T: Clone + Destructible + 'static>(&mut self, stage: Stage, resource: &T) {
        debug_assert!(
            self.stages
                .last()
                .map_or(true, |last| creation_rank(*last) <= creation_rank(stage)),
            "{stage} recorded after {:?}",
            self.stages.last()
        );
        self.stages.push(stage);
        self.stack.push_resource(resource);
    }

    /// Stages of the recorded entries, oldest first
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Releases every entry, newest first
    pub fn flush(&mut self) {
        self.stack.flush();
        self.stages.clear();
    }
}

/// Everything needed to start presenting to a window
///
/// Dropping the context releases image views, swapchain, logical device, surface, diagnostic
/// channel and instance, in that order.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct RenderContext {
    instance: Instance,
    instance_functions: InstanceFunctions,
    messenger: Option<DebugMessenger>,
    surface: Surface,
    physical_device: SelectedDevice,
    device: LogicalDevice,
    device_functions: DeviceFunctions,
    queues: QueueHandles,
    plan: SwapchainPlan,
    swapchain: Swapchain,
    image_views: Vec<ImageView>,
    #[derivative(Debug = "ignore")]
    teardown: Teardown,
}

impl RenderContext {
    /// Runs the whole bootstrap against `window`
    ///
    /// Stops at the first failing stage. Whatever was created up to that point is released in
    /// reverse before the error is returned.
    pub fn new<W: PresentableWindow>(settings: &AppSettings, window: &W) -> crate::Result<Self> {
        let mut teardown = Teardown::new();

        let instance = InstanceBuilder::from_settings(settings)?
            .add_extensions(crate::wsi::required_extensions(window)?)
            .build()?;
        teardown.record(Stage::Instance, &instance);

        let instrumented = instance.sink_slot().is_some();
        let instance_functions = InstanceFunctions::resolve(&instance, instrumented)?;

        let messenger = if instrumented {
            let messenger = DebugMessenger::new(
                &instance,
                &instance_functions,
                settings.diagnostics.severities,
                settings.diagnostics.kinds,
            )?;
            teardown.record(Stage::DiagnosticChannel, &messenger);
            tracing::info!("Attached diagnostic channel");
            Some(messenger)
        } else {
            None
        };

        let surface = Surface::new(&instance, &instance_functions, window)?;
        teardown.record(Stage::Surface, &surface);
        tracing::info!(
            "Bound surface to a {}x{} window",
            window.width(),
            window.height()
        );

        let physical_device = PhysicalDeviceSelector::new()
            .select(&PresentationProbe::new(instance.get_instance(), &surface))?;

        let (device, queues) = LogicalDeviceBuilder::new(physical_device.clone()).build(&instance)?;
        teardown.record(Stage::LogicalDevice, &device);
        let device_functions = DeviceFunctions::resolve(&instance, &device)?;

        let plan = SurfaceNegotiation::query(&surface, physical_device.handle())?
            .negotiate(&physical_device)?;
        let (swapchain, image_views) = SwapchainBuilder::new(&plan, &surface).build(
            &device_functions,
            device.clone(),
            &mut teardown,
        )?;

        Ok(Self {
            instance,
            instance_functions,
            messenger,
            surface,
            physical_device,
            device,
            device_functions,
            queues,
            plan,
            swapchain,
            image_views,
            teardown,
        })
    }

    pub fn get_instance(&self) -> &Instance {
        &self.instance
    }

    pub fn get_instance_functions(&self) -> &InstanceFunctions {
        &self.instance_functions
    }

    /// Present only when validation was enabled
    pub fn get_messenger(&self) -> Option<&DebugMessenger> {
        self.messenger.as_ref()
    }

    pub fn get_surface(&self) -> &Surface {
        &self.surface
    }

    pub fn get_physical_device(&self) -> &SelectedDevice {
        &self.physical_device
    }

    pub fn get_device(&self) -> &LogicalDevice {
        &self.device
    }

    pub fn get_device_functions(&self) -> &DeviceFunctions {
        &self.device_functions
    }

    pub fn get_queues(&self) -> &QueueHandles {
        &self.queues
    }

    pub fn get_plan(&self) -> &SwapchainPlan {
        &self.plan
    }

    pub fn get_swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    pub fn get_image_views(&self) -> &[ImageView] {
        &self.image_views
    }

    /// Stages whose resources are released on drop, in creation order
    pub fn created_stages(&self) -> &[Stage] {
        self.teardown.stages()
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        tracing::info!("Releasing render context");
        self.teardown.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone)]
    struct Released {
        stage: Stage,
        log: Rc<RefCell<Vec<Stage>>>,
    }

    impl Destructible for Released {
        fn destroy(&mut self) {
            self.log.borrow_mut().push(self.stage);
        }
    }

    fn record_all(teardown: &mut Teardown, stages: &[Stage], log: &Rc<RefCell<Vec<Stage>>>) {
        for &stage in stages {
            teardown.record(
                stage,
                &Released {
                    stage,
                    log: log.clone(),
                },
            );
        }
    }

    #[test]
    fn releases_views_first_and_instance_last() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut teardown = Teardown::new();
        record_all(
            &mut teardown,
            &[
                Stage::Instance,
                Stage::DiagnosticChannel,
                Stage::Surface,
                Stage::LogicalDevice,
                Stage::Swapchain,
                Stage::ImageView,
                Stage::ImageView,
            ],
            &log,
        );
        assert_eq!(teardown.stages().len(), 7);
        teardown.flush();
        assert!(teardown.stages().is_empty());
        assert_eq!(
            *log.borrow(),
            vec![
                Stage::ImageView,
                Stage::ImageView,
                Stage::Swapchain,
                Stage::LogicalDevice,
                Stage::Surface,
                Stage::DiagnosticChannel,
                Stage::Instance,
            ]
        );
    }

    #[test]
    fn channel_is_optional() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut teardown = Teardown::new();
        record_all(
            &mut teardown,
            &[Stage::Instance, Stage::Surface, Stage::LogicalDevice],
            &log,
        );
        drop(teardown);
        assert_eq!(
            *log.borrow(),
            vec![Stage::LogicalDevice, Stage::Surface, Stage::Instance]
        );
    }

    #[test]
    fn partial_build_releases_only_what_exists() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut teardown = Teardown::new();
            record_all(
                &mut teardown,
                &[Stage::Instance, Stage::DiagnosticChannel, Stage::Surface],
                &log,
            );
        }
        assert_eq!(
            *log.borrow(),
            vec![Stage::Surface, Stage::DiagnosticChannel, Stage::Instance]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "recorded after")]
    fn out_of_order_record_is_caught() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut teardown = Teardown::new();
        record_all(&mut teardown, &[Stage::LogicalDevice, Stage::Surface], &log);
    }
}
