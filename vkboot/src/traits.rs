/// Describes Vulkan resources which can be destroyed
pub trait Destructible {
    /// Destroy the resource
    ///
    /// The resource must not be used after this call. Owners are released by a
    /// [`DeletionStack`](crate::util::DeletionStack), which guarantees dependents go first.
    fn destroy(&mut self);
}
