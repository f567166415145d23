/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

#![warn(missing_docs)]

//! Containers shared by the search and decision agents.
//!
//! The three fringe disciplines used by graph search (LIFO, FIFO and lowest-priority-first) all
//! implement [`Fringe`], so a single graph search loop can be reused by every uninformed and
//! informed strategy. [`counter::Counter`] is the default-zero mapping used for value tables and
//! feature vectors.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

pub mod counter;

pub use counter::Counter;

/// Numeric type used for priorities, costs and values across the agents.
pub type Float = f64;

/// A Fringe holds nodes waiting to be expanded. The order in which they come back out of `pop`
/// is the only thing that differs between depth-first, breadth-first, uniform-cost and A*.
pub trait Fringe<T> {
    /// Add an item. Fringes that do not order by priority ignore `priority`.
    fn push(&mut self, item: T, priority: Float);

    /// Remove the next item to expand, if any.
    fn pop(&mut self) -> Option<T>;

    /// Whether there is nothing left to expand.
    fn is_empty(&self) -> bool;
}

/// Last-in-first-out container.
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Push an item on top of the stack.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Pop the most recently pushed item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Number of items on the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Fringe<T> for Stack<T> {
    fn push(&mut self, item: T, _priority: Float) {
        Stack::push(self, item);
    }

    fn pop(&mut self) -> Option<T> {
        Stack::pop(self)
    }

    fn is_empty(&self) -> bool {
        Stack::is_empty(self)
    }
}

/// First-in-first-out container.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Enqueue an item at the back.
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Dequeue the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Fringe<T> for Queue<T> {
    fn push(&mut self, item: T, _priority: Float) {
        Queue::push(self, item);
    }

    fn pop(&mut self) -> Option<T> {
        Queue::pop(self)
    }

    fn is_empty(&self) -> bool {
        Queue::is_empty(self)
    }
}

#[derive(Debug, Clone)]
struct PriorityEntry<T> {
    priority: Float,
    sequence: u64,
    item: T,
}

impl<T> PartialEq for PriorityEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for PriorityEntry<T> {}

impl<T> PartialOrd for PriorityEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap, so both keys are reversed: the lowest priority comes out first, and
// among equal priorities the earliest push comes out first.
impl<T> Ord for PriorityEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Lowest-priority-first container. Items with equal priority are popped in insertion order, so
/// searches built on it are deterministic.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<PriorityEntry<T>>,
    next_sequence: u64,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    /// Create an empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Insert an item with a priority. Lower priorities are popped first.
    pub fn push(&mut self, item: T, priority: Float) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(PriorityEntry {
            priority,
            sequence,
            item,
        });
    }

    /// Remove the item with the lowest priority.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    /// Remove the item with the lowest priority, along with that priority.
    pub fn pop_with_priority(&mut self) -> Option<(T, Float)> {
        self.heap.pop().map(|entry| (entry.item, entry.priority))
    }

    /// Number of items in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Fringe<T> for PriorityQueue<T> {
    fn push(&mut self, item: T, priority: Float) {
        PriorityQueue::push(self, item, priority);
    }

    fn pop(&mut self) -> Option<T> {
        PriorityQueue::pop(self)
    }

    fn is_empty(&self) -> bool {
        PriorityQueue::is_empty(self)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn drain<T>(fringe: &mut impl Fringe<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(item) = fringe.pop() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = Stack::new();
        for i in 0..4 {
            Fringe::push(&mut stack, i, 0.0);
        }
        assert_eq!(stack.len(), 4);
        assert_eq!(drain(&mut stack), vec![3, 2, 1, 0]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = Queue::new();
        for i in 0..4 {
            Fringe::push(&mut queue, i, 10.0 - i as Float);
        }
        assert_eq!(drain(&mut queue), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_priority_queue_pops_lowest_first() {
        let mut queue = PriorityQueue::new();
        queue.push("c", 3.0);
        queue.push("a", 1.0);
        queue.push("b", 2.0);
        assert_eq!(queue.pop_with_priority(), Some(("a", 1.0)));
        assert_eq!(queue.pop(), Some("b"));
        assert_eq!(queue.pop(), Some("c"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_priority_queue_ties_pop_in_insertion_order() {
        let mut queue = PriorityQueue::new();
        queue.push("first", 1.0);
        queue.push("second", 1.0);
        queue.push("zero", 0.0);
        queue.push("third", 1.0);
        assert_eq!(drain(&mut queue), vec!["zero", "first", "second", "third"]);
    }

    proptest! {
        #[test]
        fn test_priority_queue_output_is_sorted_and_stable(
            priorities in prop::collection::vec(0..5i32, 0..40),
        ) {
            let mut queue = PriorityQueue::new();
            for (index, priority) in priorities.iter().enumerate() {
                queue.push(index, Float::from(*priority));
            }
            let popped = drain(&mut queue);
            prop_assert_eq!(popped.len(), priorities.len());

            let mut expected: Vec<usize> = (0..priorities.len()).collect();
            expected.sort_by_key(|index| priorities[*index]);
            prop_assert_eq!(popped, expected);
        }
    }
}
