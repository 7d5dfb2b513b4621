use super::LinkedQueue;
use crate::{error::QueueError, StringQueue};

/// A queue handle that may be absent. Mutations on an absent queue report
/// [`QueueError::Absent`] or do nothing, and its size is zero.
impl StringQueue for Option<LinkedQueue> {
    fn insert_head(&mut self, value: &str) -> Result<(), QueueError> {
        self.as_mut().ok_or(QueueError::Absent)?.insert_head(value)
    }

    fn insert_tail(&mut self, value: &str) -> Result<(), QueueError> {
        self.as_mut().ok_or(QueueError::Absent)?.insert_tail(value)
    }

    fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<(), QueueError> {
        self.as_mut().ok_or(QueueError::Absent)?.remove_head(out)
    }

    fn size(&self) -> usize {
        self.as_ref().map_or(0, LinkedQueue::size)
    }

    fn reverse(&mut self) {
        if let Some(queue) = self {
            queue.reverse();
        }
    }

    fn sort(&mut self) {
        if let Some(queue) = self {
            queue.sort();
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{create, destroy, error::QueueError, LinkedQueue, StringQueue};

    #[test]
    fn absent_queue() {
        let mut queue: Option<LinkedQueue> = None;
        let mut buf = [0u8; 8];
        assert_eq!(queue.insert_head("a"), Err(QueueError::Absent));
        assert_eq!(queue.insert_tail("a"), Err(QueueError::Absent));
        assert_eq!(
            queue.remove_head(Some(&mut buf[..])),
            Err(QueueError::Absent)
        );
        assert_eq!(queue.size(), 0);
        queue.reverse();
        queue.sort();
        assert_eq!(destroy(queue), 0);
    }

    #[test]
    fn present_queue_forwards() {
        let mut queue = create();
        queue.insert_tail("b2").unwrap();
        queue.insert_tail("b10").unwrap();
        queue.insert_head("b1").unwrap();
        queue.reverse();
        queue.sort();
        assert_eq!(queue.size(), 3);

        let mut buf = [0u8; 3];
        queue.remove_head(Some(&mut buf[..])).unwrap();
        assert_eq!(&buf, b"b1\0");
        assert_eq!(queue.remove_head(None), Ok(()));
        assert_eq!(destroy(queue), 1);
    }
}
