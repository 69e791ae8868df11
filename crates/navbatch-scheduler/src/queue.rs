use navbatch_types::MutationDescriptor;

/// Ordered buffer of pending mutations for one scope.
///
/// FIFO, append-only between drains. Insertion order is application order.
#[derive(Debug, Default)]
pub struct MutationQueue {
    items: Vec<MutationDescriptor>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, descriptor: MutationDescriptor) {
        self.items.push(descriptor);
    }

    /// Take every queued descriptor, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<MutationDescriptor> {
        std::mem::take(&mut self.items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
