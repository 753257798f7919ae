//! Exported objects indexed by object path.
//!
//! Each level keeps its children sorted by segment. Removing an object only
//! clears the node: the structure stays so introspection of parents keeps
//! listing it.

use crate::error::object_path::ObjectPathError;

use common::ErrorLocation;

use std::fmt;
use std::panic::Location;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::debug;
use regex::Regex;

const OBJECT_PATH_PATTERN: &str = r"^(/|(/[A-Za-z0-9_]+)+)$";

static OBJECT_PATH_REGEX: OnceLock<Regex> = OnceLock::new();

fn object_path_regex() -> &'static Regex {
    OBJECT_PATH_REGEX.get_or_init(|| Regex::new(OBJECT_PATH_PATTERN).expect("valid regex pattern"))
}

/// Check an object path: `/`, or `/`-separated non-empty segments of
/// `[A-Za-z0-9_]`.
#[track_caller]
pub fn validate_object_path(path: &str) -> Result<(), ObjectPathError> {
    if object_path_regex().is_match(path) {
        Ok(())
    } else {
        Err(ObjectPathError::InvalidPath {
            path: path.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[derive(Debug)]
struct TreeNode<E> {
    segment: String,
    endpoint: Option<E>,
    fragment: Option<String>,
    children: Vec<TreeNode<E>>,
}

impl<E> TreeNode<E> {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            endpoint: None,
            fragment: None,
            children: Vec::new(),
        }
    }

    fn position(&self, segment: &str) -> Result<usize, usize> {
        self.children
            .binary_search_by(|child| child.segment.as_str().cmp(segment))
    }

    fn child(&self, segment: &str) -> Option<&TreeNode<E>> {
        let index = self.position(segment).ok()?;
        Some(&self.children[index])
    }

    fn child_mut_or_insert(&mut self, segment: &str) -> &mut TreeNode<E> {
        let index = match self.position(segment) {
            Ok(index) => index,
            Err(index) => {
                self.children.insert(index, TreeNode::new(segment));
                index
            }
        };
        &mut self.children[index]
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut TreeNode<E>> {
        let index = self.position(segment).ok()?;
        Some(&mut self.children[index])
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment)?;
        if self.endpoint.is_some() {
            f.write_str("*")?;
        }
        if !self.children.is_empty() {
            f.write_str("/{")?;
            for (index, child) in self.children.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                child.render(f)?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

/// Copy of one node, detached from the tree lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot<E> {
    pub path: String,
    pub endpoint: Option<E>,
    pub fragment: Option<String>,
    /// Child segments in ascending order.
    pub children: Vec<String>,
}

/// Path-indexed registry of endpoints of type `E`.
#[derive(Debug)]
pub struct ObjectTree<E> {
    root: Mutex<TreeNode<E>>,
}

impl<E> Default for ObjectTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ObjectTree<E> {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(TreeNode::new("")),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TreeNode<E>> {
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `endpoint` and its introspection `fragment` at `path`,
    /// creating intermediate nodes as needed. An existing registration at the
    /// same path is replaced.
    #[track_caller]
    pub fn add(
        &self,
        path: &str,
        endpoint: E,
        fragment: Option<String>,
    ) -> Result<(), ObjectPathError> {
        validate_object_path(path)?;
        debug!("Adding {path} to object tree");

        let mut root = self.lock();
        let mut node = &mut *root;
        for segment in segments(path) {
            node = node.child_mut_or_insert(segment);
        }
        node.endpoint = Some(endpoint);
        node.fragment = fragment;
        Ok(())
    }

    /// Clear the registration at `path`, returning the endpoint it held.
    pub fn remove(&self, path: &str) -> Option<E> {
        debug!("Removing {path} from object tree");
        validate_object_path(path).ok()?;

        let mut root = self.lock();
        let mut node = &mut *root;
        for segment in segments(path) {
            node = node.child_mut(segment)?;
        }
        node.fragment = None;
        node.endpoint.take()
    }

    /// Introspection document of `path`: its own fragment followed by one
    /// empty `<node/>` per child. `None` when no node exists at `path`.
    pub fn introspect(&self, path: &str) -> Option<String> {
        let root = self.lock();
        let node = Self::descend(&root, path)?;

        let mut document = format!("<node name=\"{path}\">\n");
        if let Some(fragment) = &node.fragment {
            document.push_str(fragment);
        }
        for child in &node.children {
            document.push_str(&format!("<node name=\"{}\"/>\n", child.segment));
        }
        document.push_str("</node>");
        Some(document)
    }

    fn descend<'t>(root: &'t TreeNode<E>, path: &str) -> Option<&'t TreeNode<E>> {
        validate_object_path(path).ok()?;
        let mut node = root;
        for segment in segments(path) {
            node = node.child(segment)?;
        }
        Some(node)
    }
}

impl<E: Clone> ObjectTree<E> {
    /// Look up the node at `path`, registered or not.
    pub fn find(&self, path: &str) -> Option<NodeSnapshot<E>> {
        let root = self.lock();
        let node = Self::descend(&root, path)?;
        Some(NodeSnapshot {
            path: path.to_string(),
            endpoint: node.endpoint.clone(),
            fragment: node.fragment.clone(),
            children: node.children.iter().map(|c| c.segment.clone()).collect(),
        })
    }

    /// Endpoint registered exactly at `path`.
    pub fn endpoint(&self, path: &str) -> Option<E> {
        self.find(path).and_then(|snapshot| snapshot.endpoint)
    }
}

impl<E> fmt::Display for ObjectTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lock().render(f)
    }
}
