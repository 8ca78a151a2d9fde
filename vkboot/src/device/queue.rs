use ash::vk;

/// Represents a [`vk::Queue`] and it's indices
///
/// Queues are owned by the [`LogicalDevice`](crate::device::LogicalDevice) they were retrieved
/// from and are never destroyed on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Queue {
    handle: vk::Queue,
    /// Index to the family queue
    family_index: u32,
    /// Queue's index in the family
    index: u32,
}

impl Queue {
    pub fn new(handle: vk::Queue, family_index: u32, index: u32) -> Self {
        Self {
            handle,
            family_index,
            index,
        }
    }

    pub fn handle(&self) -> vk::Queue {
        self.handle
    }

    pub fn get_family_index(&self) -> u32 {
        self.family_index
    }

    pub fn get_index(&self) -> u32 {
        self.index
    }
}

/// The two queues the pipeline needs. Both may be the same queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueHandles {
    pub graphics: Queue,
    pub present: Queue,
}

impl QueueHandles {
    /// Whether graphics and presentation share one queue
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }
}
