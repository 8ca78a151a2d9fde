use crate::traits::Destructible;

/// A stack which is used to delete objects in order
///
/// Destructors run last-in first-out. Pushing a destructor only after its resource was created
/// successfully means a flush releases exactly what was built, dependents first. The stack
/// flushes itself when dropped, so an early `?` return unwinds a half-built setup.
#[derive(Default)]
pub struct DeletionStack<'a> {
    stack: Vec<Box<dyn FnOnce() + 'a>>,
}

impl<'a> DeletionStack<'a> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Adds item onto the stack
    pub fn push<T>(&mut self, func: T)
    where
        T: FnOnce() + 'a,
    {
        self.stack.push(Box::new(func));
    }

    pub fn push_resource<T: Clone + Destructible + 'a>(&mut self, resource: &T) {
        let mut resource_clone: T = resource.clone();
        self.push(move || {
            resource_clone.destroy();
        });
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn flush(&mut self) {
        while let Some(element) = self.stack.pop() {
            element();
        }
    }
}

impl Drop for DeletionStack<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}
