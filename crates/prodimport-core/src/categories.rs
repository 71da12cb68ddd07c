//! Category tree snapshot and the path -> id lookup table built from it.
//!
//! Categories come back from the admin API as a flat list where each node
//! names its parent either by id (`parent_category_id`), by an embedded copy
//! of the parent (`parent_category`), or both. The index resolves every node
//! to its full root-to-leaf path, e.g. `"Film > 35mm > Point&Shoot"`, and
//! stores it lower-cased so CSV authors do not have to match the backend's
//! capitalisation.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

/// Separator placed between ancestor names in a category path.
pub const PATH_SEPARATOR: &str = " > ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("category tree contains a cycle at {id} (walked: {walked})")]
    Cycle { id: String, walked: String },

    #[error("category {id} references parent {parent_id}, which was not returned by the backend")]
    MissingParent { id: String, parent_id: String },
}

/// A product category as returned by the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_category_id: Option<String>,
    #[serde(default)]
    pub parent_category: Option<Box<CategoryNode>>,
}

impl CategoryNode {
    /// Id of the parent category, preferring the explicit id over the
    /// embedded object.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_category_id
            .as_deref()
            .or_else(|| self.parent_category.as_deref().map(|p| p.id.as_str()))
    }
}

/// Builds the display path for a single node by following its embedded
/// `parent_category` chain up to the root.
///
/// A root node yields its own name; a chain `A -> B -> C` yields `"A > B > C"`.
///
/// # Errors
///
/// Returns [`CategoryError::Cycle`] if the embedded chain revisits a node.
pub fn build_category_path(node: &CategoryNode) -> Result<String, CategoryError> {
    let mut names: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = Some(node);

    while let Some(n) = current {
        if !seen.insert(n.id.as_str()) {
            names.reverse();
            return Err(CategoryError::Cycle {
                id: n.id.clone(),
                walked: names.join(PATH_SEPARATOR),
            });
        }
        names.push(n.name.as_str());
        current = n.parent_category.as_deref();
    }

    names.reverse();
    Ok(names.join(PATH_SEPARATOR))
}

/// Case-insensitive map from category path to category id.
///
/// Built once per run from a full category snapshot and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    entries: HashMap<String, String>,
}

impl CategoryIndex {
    /// Resolves every category's path and indexes it by the lower-cased path.
    ///
    /// Paths are memoized per node, so shared ancestors are walked once.
    /// Embedded parents that were not part of the top-level list are indexed
    /// too. On a path collision the later category wins and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// - [`CategoryError::Cycle`] if following parent links revisits a node.
    /// - [`CategoryError::MissingParent`] if a parent id is neither in the
    ///   list nor embedded in any node.
    pub fn build(categories: &[CategoryNode]) -> Result<Self, CategoryError> {
        let (table, order) = flatten(categories);
        let mut memo: HashMap<&str, String> = HashMap::with_capacity(table.len());
        let mut entries: HashMap<String, String> = HashMap::with_capacity(table.len());

        for id in order {
            let path = resolve_path(id, &table, &mut memo)?;
            let key = path.to_lowercase();
            if let Some(previous) = entries.insert(key, id.to_owned()) {
                if previous != id {
                    tracing::warn!(
                        path = %path,
                        previous_id = %previous,
                        id,
                        "duplicate category path; keeping the later category"
                    );
                }
            }
        }

        Ok(Self { entries })
    }

    /// Looks up a category id by path, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.entries
            .get(&path.trim().to_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(path, id)` pairs sorted by path.
    #[must_use]
    pub fn paths(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(path, id)| (path.as_str(), id.as_str()))
            .collect();
        out.sort_unstable();
        out
    }
}

/// Collects every node reachable from the list, including embedded parents,
/// keyed by id. Top-level entries take precedence over embedded copies.
/// Returns the table plus ids in first-seen order.
fn flatten(categories: &[CategoryNode]) -> (HashMap<&str, &CategoryNode>, Vec<&str>) {
    let mut table: HashMap<&str, &CategoryNode> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for node in categories {
        if table.insert(node.id.as_str(), node).is_none() {
            order.push(node.id.as_str());
        }
    }

    for node in categories {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut parent = node.parent_category.as_deref();
        while let Some(p) = parent {
            if !seen.insert(p.id.as_str()) {
                break;
            }
            if !table.contains_key(p.id.as_str()) {
                table.insert(p.id.as_str(), p);
                order.push(p.id.as_str());
            }
            parent = p.parent_category.as_deref();
        }
    }

    (table, order)
}

/// Resolves the full path of `id`, filling `memo` for every node on the way.
fn resolve_path<'a>(
    id: &'a str,
    table: &HashMap<&'a str, &'a CategoryNode>,
    memo: &mut HashMap<&'a str, String>,
) -> Result<String, CategoryError> {
    if let Some(path) = memo.get(id) {
        return Ok(path.clone());
    }

    // Walk upwards until we hit a root or an already-resolved ancestor.
    let mut chain: Vec<&'a CategoryNode> = Vec::new();
    let mut visited: HashSet<&'a str> = HashSet::new();
    let mut cursor = id;
    let mut base: Option<String> = None;

    loop {
        if let Some(path) = memo.get(cursor) {
            base = Some(path.clone());
            break;
        }
        if !visited.insert(cursor) {
            let walked = chain
                .iter()
                .rev()
                .map(|n| n.name.as_str())
                .collect::<Vec<_>>()
                .join(PATH_SEPARATOR);
            return Err(CategoryError::Cycle {
                id: cursor.to_owned(),
                walked,
            });
        }
        let Some(node) = table.get(cursor).copied() else {
            // Only reachable for a dangling parent id; `id` itself is always in the table.
            let child = chain.last().map_or(id, |n| n.id.as_str());
            return Err(CategoryError::MissingParent {
                id: child.to_owned(),
                parent_id: cursor.to_owned(),
            });
        };
        chain.push(node);
        match node.parent_id() {
            Some(parent) => cursor = parent,
            None => break,
        }
    }

    let mut path = base;
    for node in chain.into_iter().rev() {
        let full = match path {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{}", node.name),
            None => node.name.clone(),
        };
        memo.insert(node.id.as_str(), full.clone());
        path = Some(full);
    }

    Ok(path.unwrap_or_default())
}

#[cfg(test)]
#[path = "categories_test.rs"]
mod tests;
