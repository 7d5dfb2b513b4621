use std::{cmp::Ordering, ptr::NonNull};

use super::{Link, Node};
use crate::natural::natural_cmp;

/// Top-down merge sort that only relinks nodes. Recursion depth is
/// logarithmic in the chain length.
///
/// # Safety
/// `head` must start a valid chain that nothing else accesses during the
/// sort.
pub(super) unsafe fn merge_sort(head: Link) -> Link {
    let Some(first) = head else {
        return head;
    };
    if (*first.as_ptr()).next.is_none() {
        return head;
    }
    let back = split_off_back(first);
    merge(merge_sort(head), merge_sort(back))
}

/// Detaches everything after the slow pointer, where the slow pointer
/// advances once for every two steps of a fast pointer starting one node
/// ahead. For odd lengths the front half keeps the extra node.
///
/// # Safety
/// As for [`merge_sort`].
unsafe fn split_off_back(head: NonNull<Node>) -> Link {
    let mut slow = head;
    let mut fast = (*head.as_ptr()).next;
    while let Some(step) = fast {
        let Some(next) = (*step.as_ptr()).next else {
            break;
        };
        slow = match (*slow.as_ptr()).next {
            Some(slow_next) => slow_next,
            None => break,
        };
        fast = (*next.as_ptr()).next;
    }
    (*slow.as_ptr()).next.take()
}

/// Merges two sorted chains. On equal keys the left element goes first.
///
/// # Safety
/// Both chains must be valid and disjoint.
unsafe fn merge(mut left: Link, mut right: Link) -> Link {
    let mut head: Link = None;
    let mut tail: Link = None;
    while let (Some(l), Some(r)) = (left, right) {
        let node = if natural_cmp(&(*l.as_ptr()).value, &(*r.as_ptr()).value) == Ordering::Greater
        {
            right = (*r.as_ptr()).next;
            r
        } else {
            left = (*l.as_ptr()).next;
            l
        };
        match tail {
            Some(tail) => (*tail.as_ptr()).next = Some(node),
            None => head = Some(node),
        }
        tail = Some(node);
    }

    let rest = left.or(right);
    match tail {
        Some(tail) => (*tail.as_ptr()).next = rest,
        None => head = rest,
    }
    head
}
