//! Layout files: a TOML description of a manager graph.
//!
//! ```toml
//! update_on_searching = true
//!
//! [attributes]            # root attributes, visible to every node
//! owner = "ops"
//!
//! [[manager]]
//! kind = "label"
//! label = "Tables"
//!
//! [[manager.children]]
//! kind = "names"
//! names = ["orders", "customers"]
//! recursive = false
//! attributes = { kind = "table" }   # set on every node this manager creates
//! ```
//!
//! Kinds: `label` (one fixed node), `names` (one node per name) and
//! `directory` (entries of `path`, or of the nearest ancestor's `path`
//! attribute).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::services::directory::{DirectoryOptions, DirectoryProvider};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{LabelProvider, ManagerBuilder, NamesProvider, Tree, TreeManager, Value};
use crate::infrastructure::traits::{DirectoryLister, FileSystem};
use crate::util::path::resolve_path;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    Label,
    Names,
    Directory,
}

/// One manager of a layout and, nested, its sub-managers.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManagerLayout {
    pub kind: ManagerKind,
    /// Node label for `label`; diagnostic label otherwise
    pub label: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
    /// Directory for `directory`; `~` and `$VAR` expanded, relative to the layout file
    pub path: Option<String>,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Attributes set on every node the manager creates
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<ManagerLayout>,
}

fn default_recursive() -> bool {
    true
}

/// A parsed layout file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    pub update_on_searching: Option<bool>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default, rename = "manager")]
    pub managers: Vec<ManagerLayout>,
}

/// Loads layout files and turns them into trees.
pub struct LayoutService {
    fs: Arc<dyn FileSystem>,
    lister: Arc<dyn DirectoryLister>,
    options: DirectoryOptions,
}

impl LayoutService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        lister: Arc<dyn DirectoryLister>,
        options: DirectoryOptions,
    ) -> Self {
        Self {
            fs,
            lister,
            options,
        }
    }

    /// Read and parse a layout file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Layout> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read layout", path)?;
        Self::parse(&content, path)
    }

    /// Parse layout TOML; `path` only labels errors.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Layout> {
        let layout: Layout = toml::from_str(content).map_err(|e| ApplicationError::Layout {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        for manager in &layout.managers {
            validate(manager, path)?;
        }
        Ok(layout)
    }

    /// Build a tree from `layout`; relative directory paths resolve against `base`.
    ///
    /// The tree is not updated yet. `update_on_searching` applies when the
    /// layout does not set it.
    pub fn build_tree(
        &self,
        layout: &Layout,
        base: Option<&Path>,
        update_on_searching: bool,
    ) -> ApplicationResult<Tree> {
        let mut tree = Tree::new()
            .with_update_on_searching(layout.update_on_searching.unwrap_or(update_on_searching));
        for (name, value) in &layout.attributes {
            tree.set_attribute(name, Some(value.clone()))?;
        }
        for manager in &layout.managers {
            tree.add_manager(self.build_manager(manager, base));
        }
        debug!("layout tree with {} top-level managers", tree.managers().len());
        Ok(tree)
    }

    /// Convenience: `load` followed by `build_tree` relative to the file's directory.
    pub fn load_tree(&self, path: &Path, update_on_searching: bool) -> ApplicationResult<Tree> {
        let layout = self.load(path)?;
        self.build_tree(&layout, path.parent(), update_on_searching)
    }

    fn build_manager(&self, layout: &ManagerLayout, base: Option<&Path>) -> Arc<TreeManager> {
        let builder = match layout.kind {
            ManagerKind::Label => {
                let label = layout.label.clone().unwrap_or_default();
                TreeManager::builder(LabelProvider::new(label.clone())).label(label)
            }
            ManagerKind::Names => TreeManager::builder(NamesProvider::new(layout.names.clone()))
                .label(layout.label.clone().unwrap_or_else(|| "names".into())),
            ManagerKind::Directory => {
                let mut provider =
                    DirectoryProvider::new(Arc::clone(&self.lister), self.options.clone());
                if let Some(path) = &layout.path {
                    provider = provider.with_dir(resolve_path(path, base));
                }
                TreeManager::builder(provider)
                    .label(layout.label.clone().unwrap_or_else(|| "directory".into()))
            }
        };
        self.finish(builder, layout, base)
    }

    fn finish(
        &self,
        mut builder: ManagerBuilder,
        layout: &ManagerLayout,
        base: Option<&Path>,
    ) -> Arc<TreeManager> {
        builder = builder.recursive(layout.recursive);
        for (name, value) in &layout.attributes {
            builder = builder.new_node_attribute(name.clone(), Some(value.clone()));
        }
        for child in &layout.children {
            builder = builder.add_manager(self.build_manager(child, base));
        }
        builder.build()
    }
}

fn validate(manager: &ManagerLayout, path: &Path) -> ApplicationResult<()> {
    let problem = match manager.kind {
        ManagerKind::Label if manager.label.as_deref().map_or(true, str::is_empty) => {
            Some("label manager needs a non-empty 'label'")
        }
        ManagerKind::Label | ManagerKind::Directory if !manager.names.is_empty() => {
            Some("'names' is only valid for names managers")
        }
        ManagerKind::Label | ManagerKind::Names if manager.path.is_some() => {
            Some("'path' is only valid for directory managers")
        }
        _ => None,
    };
    if let Some(message) = problem {
        return Err(ApplicationError::Layout {
            path: path.to_path_buf(),
            message: message.to_string(),
        });
    }
    for child in &manager.children {
        validate(child, path)?;
    }
    Ok(())
}

/// Default location of a named layout inside the configured layout directory.
pub fn layout_file(layout_dir: &Path, name: &str) -> PathBuf {
    if name.ends_with(".toml") {
        layout_dir.join(name)
    } else {
        layout_dir.join(format!("{}.toml", name))
    }
}
