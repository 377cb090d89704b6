//! Call tree assembly from nested span begin/end events.
//!
//! The builder keeps an explicit stack of open frames. Closing a frame
//! finalizes it into a [`CallTreeNode`] and attaches it to whichever frame is
//! now on top of the stack; nesting follows call order, never key identity.
//! A frame closed with an empty stack below it becomes a new root.

use super::clock::Timestamp;
use crate::utils::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Finalized span invocation with its nested children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTreeNode<K> {
    pub key: K,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Children in the order they began
    pub children: Vec<CallTreeNode<K>>,
}

impl<K> CallTreeNode<K> {
    pub fn elapsed(&self) -> Duration {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Time not covered by any child span
    pub fn self_time(&self) -> Duration {
        let children: Duration = self.children.iter().map(CallTreeNode::elapsed).sum();
        self.elapsed().saturating_sub(children)
    }

    /// Number of spans in this subtree, including this one
    pub fn span_count(&self) -> usize {
        1 + self.children.iter().map(CallTreeNode::span_count).sum::<usize>()
    }

    /// Nodes of this subtree in begin order
    pub fn preorder(&self) -> Preorder<'_, K> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order traversal over a call tree
pub struct Preorder<'a, K> {
    stack: Vec<&'a CallTreeNode<K>>,
}

impl<'a, K> Iterator for Preorder<'a, K> {
    type Item = &'a CallTreeNode<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Open span whose end time is still pending
#[derive(Debug)]
struct SpanFrame<K> {
    key: K,
    start_time: Timestamp,
    children: Vec<CallTreeNode<K>>,
}

impl<K> SpanFrame<K> {
    fn close(self, end_time: Timestamp) -> CallTreeNode<K> {
        CallTreeNode {
            key: self.key,
            start_time: self.start_time,
            end_time,
            children: self.children,
        }
    }
}

/// Reconstructs the call forest of one run
#[derive(Debug)]
pub struct CallTreeBuilder<K> {
    stack: Vec<SpanFrame<K>>,
    roots: Vec<CallTreeNode<K>>,
}

impl<K> Default for CallTreeBuilder<K> {
    fn default() -> Self {
        Self {
            stack: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl<K> CallTreeBuilder<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open frames
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn open(&mut self, key: K, start_time: Timestamp) {
        self.stack.push(SpanFrame {
            key,
            start_time,
            children: Vec::new(),
        });
    }

    /// Close the innermost open frame
    ///
    /// # Errors
    /// * `TrackerError::InvalidState` - no frame is open
    pub fn close(&mut self, end_time: Timestamp) -> Result<(), TrackerError> {
        let frame = self.stack.pop().ok_or_else(|| {
            TrackerError::InvalidState("cannot close a span: no frame is open".to_string())
        })?;

        let node = frame.close(end_time);
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }

        Ok(())
    }

    /// Completed roots, in the order their outermost span began
    pub fn roots(&self) -> &[CallTreeNode<K>] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<CallTreeNode<K>> {
        self.roots
    }

    /// Drop all open frames and completed roots
    pub fn clear(&mut self) {
        self.stack.clear();
        self.roots.clear();
    }
}
