//! Motion queue backed by a fixed pool of segment nodes.
//!
//! Nodes are linked by 16-bit index rather than pointer. Released nodes go
//! on a free list and are reused before untouched ones, so append and pop
//! are O(1) and never allocate.

use crate::error::QueueError;

use super::segment::MotionSegment;

/// Default number of segment nodes per stepper.
///
/// Each node takes 16 bytes, so the default pool is 512 bytes and lives
/// inline in every [`VirtualStepper`](crate::VirtualStepper). A system with
/// many steppers should pick a smaller depth through the const generic.
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

type NodeIndex = u16;

#[derive(Debug, Clone, Copy)]
struct Node {
    segment: MotionSegment,
    next: Option<NodeIndex>,
}

impl Node {
    const EMPTY: Self = Self {
        segment: MotionSegment::EMPTY,
        next: None,
    };
}

/// FIFO of pending motion segments.
///
/// `N` is the node pool size and must fit a 16-bit index; appending to a
/// full pool fails with [`QueueError::Full`].
#[derive(Debug, Clone)]
pub struct MotionQueue<const N: usize = DEFAULT_QUEUE_DEPTH> {
    nodes: [Node; N],
    head: Option<NodeIndex>,
    tail: Option<NodeIndex>,
    /// Released nodes, linked through `Node::next`.
    free: Option<NodeIndex>,
    /// Nodes at or above this index have never been handed out.
    fresh: NodeIndex,
    len: NodeIndex,
}

impl<const N: usize> Default for MotionQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MotionQueue<N> {
    const INDEX_FITS: () = assert!(N <= NodeIndex::MAX as usize, "queue depth exceeds u16");

    /// Create an empty queue.
    pub const fn new() -> Self {
        let () = Self::INDEX_FITS;
        Self {
            nodes: [Node::EMPTY; N],
            head: None,
            tail: None,
            free: None,
            fresh: 0,
            len: 0,
        }
    }

    /// Pool capacity in segments.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of queued segments.
    #[inline]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Check if no segment is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Peek at the head segment.
    pub fn front(&self) -> Option<&MotionSegment> {
        self.head.map(|idx| &self.node(idx).segment)
    }

    /// Append a segment at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] if every node is in use.
    pub fn push_back(&mut self, segment: MotionSegment) -> Result<(), QueueError> {
        let idx = self.alloc().ok_or(QueueError::Full { capacity: N })?;
        *self.node_mut(idx) = Node {
            segment,
            next: None,
        };
        match self.tail {
            Some(last) => self.node_mut(last).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the head segment.
    pub fn pop_front(&mut self) -> Option<MotionSegment> {
        let idx = self.head?;
        let node = *self.node(idx);
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.release(idx);
        self.len -= 1;
        Some(node.segment)
    }

    /// Release every queued segment without consuming it.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.free = None;
        self.fresh = 0;
        self.len = 0;
    }

    /// Iterate queued segments from head to tail.
    pub fn iter(&self) -> Iter<'_, N> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }

    #[inline]
    fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[usize::from(idx)]
    }

    #[inline]
    fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[usize::from(idx)]
    }

    fn alloc(&mut self) -> Option<NodeIndex> {
        if let Some(idx) = self.free {
            self.free = self.node(idx).next;
            return Some(idx);
        }
        if usize::from(self.fresh) < N {
            let idx = self.fresh;
            self.fresh += 1;
            return Some(idx);
        }
        None
    }

    fn release(&mut self, idx: NodeIndex) {
        self.node_mut(idx).next = self.free;
        self.free = Some(idx);
    }
}

/// Iterator over queued segments.
pub struct Iter<'a, const N: usize> {
    queue: &'a MotionQueue<N>,
    cursor: Option<NodeIndex>,
}

impl<'a, const N: usize> Iterator for Iter<'a, N> {
    type Item = &'a MotionSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.queue.node(idx);
        self.cursor = node.next;
        Some(&node.segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Direction;

    fn seg(interval: u32) -> MotionSegment {
        MotionSegment::new(interval, 1, 0, Direction::Forward)
    }

    #[test]
    fn test_fifo_order() {
        let mut queue: MotionQueue<4> = MotionQueue::new();
        queue.push_back(seg(1)).unwrap();
        queue.push_back(seg(2)).unwrap();
        queue.push_back(seg(3)).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_front().unwrap().interval, 1);
        assert_eq!(queue.pop_front().unwrap().interval, 2);
        assert_eq!(queue.pop_front().unwrap().interval, 3);
        assert!(queue.pop_front().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_pool() {
        let mut queue: MotionQueue<2> = MotionQueue::new();
        queue.push_back(seg(1)).unwrap();
        queue.push_back(seg(2)).unwrap();
        assert_eq!(queue.push_back(seg(3)), Err(QueueError::Full { capacity: 2 }));
    }

    #[test]
    fn test_nodes_reused_after_pop() {
        let mut queue: MotionQueue<2> = MotionQueue::new();
        for round in 0..10 {
            queue.push_back(seg(round)).unwrap();
            queue.push_back(seg(round + 100)).unwrap();
            assert_eq!(queue.pop_front().unwrap().interval, round);
            assert_eq!(queue.pop_front().unwrap().interval, round + 100);
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_interleaved_push_pop_keeps_order() {
        let mut queue: MotionQueue<3> = MotionQueue::new();
        queue.push_back(seg(1)).unwrap();
        queue.push_back(seg(2)).unwrap();
        assert_eq!(queue.pop_front().unwrap().interval, 1);
        queue.push_back(seg(3)).unwrap();
        queue.push_back(seg(4)).unwrap();

        let order: Vec<u32> = queue.iter().map(|s| s.interval).collect();
        assert_eq!(order, vec![2, 3, 4]);
        assert_eq!(queue.front().unwrap().interval, 2);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut queue: MotionQueue<2> = MotionQueue::new();
        queue.push_back(seg(1)).unwrap();
        queue.push_back(seg(2)).unwrap();
        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        queue.push_back(seg(5)).unwrap();
        queue.push_back(seg(6)).unwrap();
        assert_eq!(queue.pop_front().unwrap().interval, 5);
    }

    #[test]
    fn test_default_pool_footprint() {
        // 16 bytes per node plus the list bookkeeping
        let size = core::mem::size_of::<MotionQueue<DEFAULT_QUEUE_DEPTH>>();
        assert!(size <= DEFAULT_QUEUE_DEPTH * 16 + 16, "queue is {} bytes", size);
    }
}
