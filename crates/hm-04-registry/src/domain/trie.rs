//! # Path Trie
//!
//! Prefix tree over `/`-separated paths. One generic implementation backs
//! both indexes: names to derivation paths, and derivation paths to key
//! material (wallet paths share long prefixes, which the tree stores once).

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Node<T> {
    children: BTreeMap<String, Node<T>>,
    /// Terminal iff `Some`.
    data: Option<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            data: None,
        }
    }
}

/// Trie keyed by path segments.
///
/// `a/b`, `/a/b/` and `a//b` are the same path: empty segments are skipped.
#[derive(Debug, Clone)]
pub struct PathTrie<T> {
    root: Node<T>,
    len: usize,
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

impl<T> PathTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `path`, creating intermediate nodes.
    ///
    /// Re-inserting a path overwrites it and returns the previous value.
    pub fn insert(&mut self, path: &str, data: T) -> Option<T> {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        let previous = node.data.replace(data);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Data at `path`. `None` when any segment is missing or the final node
    /// is not terminal; never a partial match.
    pub fn search(&self, path: &str) -> Option<&T> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.children.get(segment)?;
        }
        node.data.as_ref()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.search(path).is_some()
    }

    /// Number of terminal paths.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every terminal path with its data, in segment order.
    pub fn entries(&self) -> Vec<(String, &T)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = vec![(String::new(), &self.root)];
        while let Some((prefix, node)) = stack.pop() {
            if let Some(data) = &node.data {
                out.push((prefix.clone(), data));
            }
            for (segment, child) in node.children.iter().rev() {
                let path = if prefix.is_empty() {
                    segment.clone()
                } else {
                    format!("{prefix}/{segment}")
                };
                stack.push((path, child));
            }
        }
        out
    }
}
