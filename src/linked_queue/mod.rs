use std::{
    alloc::{self, Layout},
    fmt,
    marker::PhantomData,
    ptr::NonNull,
};

use tracing::{debug, trace};

use crate::{error::QueueError, StringQueue};

mod merge_sort;
mod optional;

// Nodes are only ever reached through these raw links, derived from the
// node's allocation. A `Box` exists only while a node is being released.
type Link = Option<NonNull<Node>>;

struct Node {
    value: String,
    next: Link,
}

impl Node {
    /// Allocates a node holding a private copy of `value`, reporting
    /// allocation failure instead of aborting.
    fn try_new(value: &str) -> Result<NonNull<Self>, QueueError> {
        let value = copy_value(value)?;

        let layout = Layout::new::<Node>();
        // SAFETY: `Node` is not zero-sized.
        let raw = unsafe { alloc::alloc(layout) } as *mut Node;
        let Some(node) = NonNull::new(raw) else {
            // `value` is released on return
            return Err(QueueError::Alloc {
                bytes: layout.size(),
            });
        };
        // SAFETY: freshly allocated with the layout of `Node`.
        unsafe { node.as_ptr().write(Node { value, next: None }) };
        Ok(node)
    }

    /// Takes back ownership of a node created by [`Node::try_new`].
    ///
    /// # Safety
    /// `node` must be unlinked from every chain and never used again.
    unsafe fn into_box(node: NonNull<Node>) -> Box<Node> {
        // memory came from the global allocator with `Layout::new::<Node>()`
        Box::from_raw(node.as_ptr())
    }
}

/// Copies `value` up to its first NUL byte into an allocation of exactly
/// that length.
fn copy_value(value: &str) -> Result<String, QueueError> {
    let len = value.bytes().position(|b| b == 0).unwrap_or(value.len());
    let mut copy = String::new();
    copy.try_reserve_exact(len)
        .map_err(|_| QueueError::Alloc { bytes: len })?;
    copy.push_str(&value[..len]);
    Ok(copy)
}

/// Copies at most `buf.len() - 1` bytes of `value` into `buf` and zero-fills
/// the remainder, so the last byte is always a terminator.
fn copy_truncated(value: &str, buf: &mut [u8]) {
    let Some(limit) = buf.len().checked_sub(1) else {
        return;
    };
    let copied = value.len().min(limit);
    buf[..copied].copy_from_slice(&value.as_bytes()[..copied]);
    buf[copied..].fill(0);
}

/// # Safety
/// `link` must start a valid chain.
unsafe fn last_node(link: Link) -> Link {
    let mut last = link?;
    while let Some(next) = (*last.as_ptr()).next {
        last = next;
    }
    Some(last)
}

/// Releases every node of a chain, one at a time so long chains don't
/// recurse.
///
/// # Safety
/// `link` must start a valid chain that nothing else refers to afterwards.
unsafe fn release_chain(mut link: Link) -> usize {
    let mut released = 0;
    while let Some(node) = link {
        link = Node::into_box(node).next;
        released += 1;
    }
    released
}

/// A FIFO/LIFO queue of owned strings backed by a singly-linked chain.
///
/// Insertion at either end, removal at the head and the size query are O(1).
pub struct LinkedQueue {
    head: Link,
    // Last node of the chain. `None` exactly when the queue is empty, in
    // which case the next tail insert writes into `head`.
    tail: Link,
    size: usize,
    _owns: PhantomData<Box<Node>>,
}

// SAFETY: every node is exclusively owned by the queue through `head`.
unsafe impl Send for LinkedQueue {}

impl LinkedQueue {
    pub fn new() -> Self {
        Self {
            head: None,
            tail: None,
            size: 0,
            _owns: PhantomData,
        }
    }

    pub fn insert_head(&mut self, value: &str) -> Result<(), QueueError> {
        let node =
            Node::try_new(value).inspect_err(|err| debug!(%err, "insert_head failed"))?;
        // SAFETY: `node` is fresh and not yet shared.
        unsafe { (*node.as_ptr()).next = self.head };
        if self.tail.is_none() {
            self.tail = Some(node);
        }
        self.head = Some(node);
        self.size += 1;
        Ok(())
    }

    pub fn insert_tail(&mut self, value: &str) -> Result<(), QueueError> {
        let node =
            Node::try_new(value).inspect_err(|err| debug!(%err, "insert_tail failed"))?;
        match self.tail {
            // SAFETY: `tail` is the last node of the chain owned by `self`,
            // and `&mut self` rules out any outstanding reference into it.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.size += 1;
        Ok(())
    }

    /// Removes the first element, copying it into `out` when given. A buffer
    /// shorter than the element receives a truncated, terminated prefix.
    pub fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<(), QueueError> {
        let value = self.pop_front().ok_or(QueueError::Empty)?;
        if let Some(buf) = out {
            copy_truncated(&value, buf);
        }
        Ok(())
    }

    /// Removes the first element and hands it back.
    pub fn pop_front(&mut self) -> Option<String> {
        let head = self.head?;
        // SAFETY: `head` is owned by `self` and is unlinked right here.
        let node = unsafe { Node::into_box(head) };
        self.head = node.next;
        self.size -= 1;
        if self.size == 0 {
            self.tail = None;
        }
        Some(node.value)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Reverses the queue in place by relinking nodes.
    pub fn reverse(&mut self) {
        if self.size < 2 {
            return;
        }
        let old_head = self.head;
        let mut reversed = None;
        let mut remaining = self.head;
        while let Some(node) = remaining {
            // SAFETY: every node on the chain is owned by `self`.
            unsafe {
                remaining = (*node.as_ptr()).next;
                (*node.as_ptr()).next = reversed;
            }
            reversed = Some(node);
        }
        self.head = reversed;
        self.tail = old_head;
    }

    /// Stable ascending sort in natural order, see
    /// [`natural_cmp`](crate::natural::natural_cmp).
    pub fn sort(&mut self) {
        if self.size < 2 {
            return;
        }
        // SAFETY: the chain is owned by `self` and fully relinked before
        // `head` and `tail` are reassigned.
        unsafe {
            self.head = merge_sort::merge_sort(self.head);
            self.tail = last_node(self.head);
        }
    }

    pub fn front(&self) -> Option<&str> {
        // SAFETY: nodes live as long as `self` and are not mutated through `&self`.
        self.head
            .map(|node| unsafe { (*node.as_ptr()).value.as_str() })
    }

    pub fn back(&self) -> Option<&str> {
        // SAFETY: as in `front`.
        self.tail
            .map(|node| unsafe { (*node.as_ptr()).value.as_str() })
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head,
            remaining: self.size,
            _queue: PhantomData,
        }
    }

    /// Releases every element and the queue itself, returning how many
    /// elements were released.
    pub fn destroy(self) -> usize {
        let released = self.size;
        drop(self);
        trace!(released, "queue destroyed");
        released
    }
}

impl Default for LinkedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LinkedQueue {
    fn drop(&mut self) {
        self.tail = None;
        self.size = 0;
        // SAFETY: the chain is owned by `self` and unreachable after this.
        unsafe { release_chain(self.head.take()) };
    }
}

impl fmt::Debug for LinkedQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl StringQueue for LinkedQueue {
    fn insert_head(&mut self, value: &str) -> Result<(), QueueError> {
        LinkedQueue::insert_head(self, value)
    }

    fn insert_tail(&mut self, value: &str) -> Result<(), QueueError> {
        LinkedQueue::insert_tail(self, value)
    }

    fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<(), QueueError> {
        LinkedQueue::remove_head(self, out)
    }

    fn size(&self) -> usize {
        LinkedQueue::size(self)
    }

    fn reverse(&mut self) {
        LinkedQueue::reverse(self)
    }

    fn sort(&mut self) {
        LinkedQueue::sort(self)
    }
}

pub struct Iter<'q> {
    next: Link,
    remaining: usize,
    _queue: PhantomData<&'q LinkedQueue>,
}

impl<'q> Iterator for Iter<'q> {
    type Item = &'q str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        // SAFETY: the queue is borrowed for `'q`, so its nodes stay alive and
        // unmodified.
        let node: &'q Node = unsafe { &*node.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(node.value.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'q> IntoIterator for &'q LinkedQueue {
    type Item = &'q str;
    type IntoIter = Iter<'q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
