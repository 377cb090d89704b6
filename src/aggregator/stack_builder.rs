//! Build collapsed stack format from a call forest.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "suite;create_user;create_account 1000"
//! This means: create_account ran nested in create_user inside suite,
//! spending 1000µs of its own time there.
//!
//! Stacks aggregate by full path from the root, unlike flat stats which
//! aggregate by key alone.

use crate::tracker::CallTreeNode;
use crate::utils::config::STACK_SEPARATOR;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Path as separator-joined frame names
    pub stack: String,

    /// Self time in microseconds accumulated on this path
    pub weight: u64,

    /// Number of spans that ended at this path
    pub calls: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64, calls: u64) -> Self {
        Self {
            stack,
            weight,
            calls,
        }
    }

    /// Innermost frame name
    pub fn leaf(&self) -> &str {
        self.stack
            .rsplit(STACK_SEPARATOR)
            .next()
            .unwrap_or(&self.stack)
    }

    /// Line in the collapsed flamegraph format
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from the roots of a run
///
/// # Returns
/// One entry per unique path, sorted by weight (descending), then path
///
/// # Algorithm
/// 1. Walk every root depth-first, keeping the current path
/// 2. Charge each node's self time to its path
/// 3. Aggregate by unique path (sum weights and calls)
pub fn build_collapsed_stacks<K: Display>(roots: &[CallTreeNode<K>]) -> Vec<CollapsedStack> {
    debug!("Building collapsed stacks from {} root spans", roots.len());

    // path -> (total self time µs, calls)
    let mut stack_map: HashMap<String, (u64, u64)> = HashMap::new();
    let mut path: Vec<String> = Vec::new();

    for root in roots {
        collapse_node(root, &mut path, &mut stack_map);
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, (weight, calls))| CollapsedStack::new(stack, weight, calls))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));
    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

fn collapse_node<K: Display>(
    node: &CallTreeNode<K>,
    path: &mut Vec<String>,
    stack_map: &mut HashMap<String, (u64, u64)>,
) {
    path.push(node.key.to_string());

    let entry = stack_map.entry(path.join(STACK_SEPARATOR)).or_insert((0, 0));
    entry.0 += node.self_time().as_micros() as u64;
    entry.1 += 1;

    for child in &node.children {
        collapse_node(child, path, stack_map);
    }

    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn node(
        key: &'static str,
        start: u64,
        end: u64,
        children: Vec<CallTreeNode<&'static str>>,
    ) -> CallTreeNode<&'static str> {
        CallTreeNode {
            key,
            start_time: Duration::from_millis(start),
            end_time: Duration::from_millis(end),
            children,
        }
    }

    #[test]
    fn test_collapsed_stack_to_line() {
        let stack = CollapsedStack::new("main;execute;storage_read".to_string(), 1000, 1);
        assert_eq!(stack.to_line(), "main;execute;storage_read 1000");
        assert_eq!(stack.leaf(), "storage_read");
    }

    #[test]
    fn test_paths_merge_across_roots() {
        let roots = vec![
            node("user", 0, 10, vec![node("account", 2, 6, vec![])]),
            node("user", 10, 18, vec![node("account", 12, 14, vec![])]),
        ];

        let stacks = build_collapsed_stacks(&roots);

        assert_eq!(
            stacks,
            vec![
                CollapsedStack::new("user".to_string(), 12_000, 2),
                CollapsedStack::new("user;account".to_string(), 6_000, 2),
            ]
        );
    }

    #[test]
    fn test_same_key_different_paths_stay_apart() {
        let roots = vec![
            node("account", 0, 3, vec![]),
            node("user", 3, 9, vec![node("account", 4, 8, vec![])]),
        ];

        let stacks = build_collapsed_stacks(&roots);
        let paths: Vec<&str> = stacks.iter().map(|s| s.stack.as_str()).collect();

        assert_eq!(paths, vec!["user;account", "account", "user"]);
    }

    #[test]
    fn test_empty_forest() {
        let roots: Vec<CallTreeNode<String>> = Vec::new();
        assert!(build_collapsed_stacks(&roots).is_empty());
    }
}
