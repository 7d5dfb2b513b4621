pub mod error;
pub mod linked_queue;
pub mod natural;

pub use error::QueueError;
pub use linked_queue::LinkedQueue;

/// Operations shared by a queue and by a handle to a queue that may be absent.
pub trait StringQueue {
    /// Inserts a copy of `value` as the new first element.
    fn insert_head(&mut self, value: &str) -> Result<(), QueueError>;

    /// Inserts a copy of `value` as the new last element.
    fn insert_tail(&mut self, value: &str) -> Result<(), QueueError>;

    /// Removes the first element, copying it into `out` when given. At most
    /// `out.len() - 1` bytes are copied and the rest of `out` is zeroed.
    fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<(), QueueError>;

    fn size(&self) -> usize;

    fn reverse(&mut self);

    /// Sorts ascending in natural order, keeping equal elements in place.
    fn sort(&mut self);
}

/// Creates an empty queue behind a handle that can later become absent.
pub fn create() -> Option<LinkedQueue> {
    Some(LinkedQueue::new())
}

/// Releases the queue behind `queue`, if any, and returns how many elements
/// it held.
pub fn destroy(queue: Option<LinkedQueue>) -> usize {
    queue.map_or(0, LinkedQueue::destroy)
}
