/// Failures reported by queue operations. No operation leaves the queue in a
/// partially modified state when it returns one of these.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is absent")]
    Absent,

    #[error("queue is empty")]
    Empty,

    #[error("allocation of {bytes} bytes failed")]
    Alloc { bytes: usize },
}
