//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{directory_tree, DirectoryOptions, LayoutService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{Tree, TreeResult};
use crate::infrastructure::traits::{DirectoryLister, FileSystem, RealFileSystem, WalkDirLister};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Directory listing abstraction
    pub lister: Arc<dyn DirectoryLister>,

    options: DirectoryOptions,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> ApplicationResult<Self> {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(WalkDirLister))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        lister: Arc<dyn DirectoryLister>,
    ) -> ApplicationResult<Self> {
        let options = DirectoryOptions::new(&settings.ignore, settings.show_hidden)?;
        Ok(Self {
            settings: Arc::new(settings),
            fs,
            lister,
            options,
        })
    }

    pub fn layout_service(&self) -> LayoutService {
        LayoutService::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.lister),
            self.options.clone(),
        )
    }

    /// A tree over `dir`, configured from settings but not yet updated.
    pub fn directory_tree(&self, dir: &Path) -> TreeResult<Tree> {
        let tree = directory_tree(
            Arc::clone(&self.lister),
            &self.options,
            dir,
            self.settings.max_depth,
        )?;
        Ok(tree.with_update_on_searching(self.settings.update_on_searching))
    }
}
