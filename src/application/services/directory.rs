//! Directory browsing service
//!
//! Materializes a directory hierarchy: each directory entry becomes a node
//! carrying `name`, `path` and `kind` attributes. Nodes are reconciled by
//! `path`, so entries that survive a refresh keep their identity.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    ChildrenProvider, NodeId, Tree, TreeError, TreeManager, TreeResult, UpdateContext, Value,
};
use crate::infrastructure::traits::DirectoryLister;
use crate::util::path::PathExt;

/// Attribute holding an entry's absolute path; the root carries the browsed directory.
pub const ATTRIBUTE_PATH: &str = "path";
/// Attribute holding `"dir"` or `"file"`.
pub const ATTRIBUTE_KIND: &str = "kind";

const KIND_DIR: &str = "dir";
const KIND_FILE: &str = "file";

/// Which entries a listing keeps.
#[derive(Debug, Clone, Default)]
pub struct DirectoryOptions {
    /// Entry names matching any of these are skipped
    pub ignore: Vec<Regex>,
    pub show_hidden: bool,
}

impl DirectoryOptions {
    /// Compiles `patterns`; an invalid one is a config error.
    pub fn new(patterns: &[String], show_hidden: bool) -> ApplicationResult<Self> {
        let ignore = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ApplicationError::Config {
                    message: format!("invalid ignore pattern {:?}: {}", p, e),
                })
            })
            .collect::<ApplicationResult<Vec<_>>>()?;
        Ok(Self {
            ignore,
            show_hidden,
        })
    }

    fn keeps(&self, name: &str) -> bool {
        if !self.show_hidden && Path::new(name).is_hidden() {
            return false;
        }
        !self.ignore.iter().any(|re| re.is_match(name))
    }
}

/// Children provider listing the directory of the parent node.
///
/// The directory is the parent's `path` attribute, found with an ancestor
/// walk, unless a fixed directory was configured. File nodes have no
/// children.
pub struct DirectoryProvider {
    lister: Arc<dyn DirectoryLister>,
    options: DirectoryOptions,
    dir: Option<PathBuf>,
}

impl DirectoryProvider {
    pub fn new(lister: Arc<dyn DirectoryLister>, options: DirectoryOptions) -> Self {
        Self {
            lister,
            options,
            dir: None,
        }
    }

    /// Lists `dir` regardless of the parent node.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn directory_of(&self, ctx: &UpdateContext<'_>, node: Option<NodeId>) -> Option<PathBuf> {
        if let Some(dir) = &self.dir {
            return Some(dir.clone());
        }
        let node = node?;
        if ctx.get_attribute(node, ATTRIBUTE_KIND).and_then(Value::as_str) == Some(KIND_FILE) {
            return None;
        }
        ctx.fetch_attribute(node, ATTRIBUTE_PATH)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }
}

impl ChildrenProvider for DirectoryProvider {
    fn update_children(
        &self,
        ctx: &mut UpdateContext<'_>,
        node: Option<NodeId>,
        existing: &[NodeId],
    ) -> TreeResult<Vec<NodeId>> {
        let Some(dir) = self.directory_of(ctx, node) else {
            return Ok(Vec::new());
        };
        let entries = self
            .lister
            .list(&dir)
            .map_err(|e| TreeError::manager(format!("list {}: {}", dir.display(), e)))?;

        let mut out = Vec::with_capacity(entries.len());
        for entry in entries.into_iter().filter(|e| self.options.keeps(&e.name)) {
            let path = Value::from(entry.path.to_string_lossy().into_owned());
            let id = match ctx.find_by_attribute(existing, ATTRIBUTE_PATH, &path) {
                Some(id) => id,
                None => {
                    let id = ctx.create_node(node, Some(&entry.name))?;
                    ctx.set_attribute(id, ATTRIBUTE_PATH, Some(path))?;
                    id
                }
            };
            let kind = if entry.is_dir { KIND_DIR } else { KIND_FILE };
            ctx.set_attribute(id, ATTRIBUTE_KIND, Some(Value::from(kind)))?;
            out.push(id);
        }
        debug!("{}: {} entries", dir.display(), out.len());
        Ok(out)
    }
}

/// Chain of `depth` directory managers, one per level (at least one).
pub fn directory_managers(
    lister: Arc<dyn DirectoryLister>,
    options: &DirectoryOptions,
    depth: usize,
) -> Arc<TreeManager> {
    let mut manager: Option<Arc<TreeManager>> = None;
    for level in (1..=depth.max(1)).rev() {
        let mut builder = TreeManager::builder(DirectoryProvider::new(
            Arc::clone(&lister),
            options.clone(),
        ))
        .label(format!("directory level {}", level));
        if let Some(sub) = manager.take() {
            builder = builder.add_manager(sub);
        }
        manager = Some(builder.build());
    }
    // depth.max(1) guarantees one iteration
    manager.unwrap_or_else(|| {
        TreeManager::builder(DirectoryProvider::new(lister, options.clone())).build()
    })
}

/// A tree browsing `dir` down to `depth` levels.
#[instrument(level = "debug", skip(lister, options))]
pub fn directory_tree(
    lister: Arc<dyn DirectoryLister>,
    options: &DirectoryOptions,
    dir: &Path,
    depth: usize,
) -> TreeResult<Tree> {
    let mut tree = Tree::new();
    tree.set_attribute(
        ATTRIBUTE_PATH,
        Some(Value::from(dir.to_string_lossy().into_owned())),
    )?;
    tree.add_manager(directory_managers(lister, options, depth));
    Ok(tree)
}
