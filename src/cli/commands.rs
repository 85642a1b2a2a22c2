//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::layout_file;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DumpOptions, NodeId, Tree};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => current_dir()?,
    };

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(command, &config_dir),
        Some(Commands::Dump { dir, depth, all }) => {
            let dir = match dir {
                Some(d) => d.clone(),
                None => current_dir()?,
            };
            cmd_dump(&load_container(&config_dir)?, &dir, *depth, *all)
        }
        Some(Commands::Get {
            dir,
            path,
            index,
            lazy,
        }) => cmd_get(&load_container(&config_dir)?, dir, path, *index, *lazy),
        Some(Commands::Layout { layout, path, all }) => {
            cmd_layout(&load_container(&config_dir)?, layout, path.as_deref(), *all)
        }
        None => Ok(()),
    }
}

fn load_container(config_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(config_dir))?;
    Ok(ServiceContainer::new(settings)?)
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir()
        .map_err(|e| CliError::Infra(InfraError::io("determine current directory", e)))
}

fn canonical_dir(container: &ServiceContainer, dir: &Path) -> CliResult<PathBuf> {
    if !container.fs.is_dir(dir) {
        return Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        )));
    }
    container
        .fs
        .canonicalize(dir)
        .map_err(|e| CliError::Infra(InfraError::io(format!("resolve {}", dir.display()), e)))
}

fn dump_options(container: &ServiceContainer, all: bool) -> DumpOptions {
    DumpOptions {
        all_attributes: all || container.settings.dump_all_attributes,
    }
}

#[instrument(skip(container))]
fn cmd_dump(
    container: &ServiceContainer,
    dir: &Path,
    depth: Option<usize>,
    all: bool,
) -> CliResult<()> {
    let dir = canonical_dir(container, dir)?;
    let mut tree = match depth {
        Some(depth) => {
            let settings = Settings {
                max_depth: depth,
                ..(*container.settings).clone()
            };
            ServiceContainer::with_deps(
                settings,
                container.fs.clone(),
                container.lister.clone(),
            )?
            .directory_tree(&dir)?
        }
        None => container.directory_tree(&dir)?,
    };
    tree.update_all()?;
    debug!(
        "dumping {} nodes over {} levels",
        tree.nodes().len(),
        tree.nodes().depth()
    );
    output::header(&dir.display());
    output::info(tree.dump(None, dump_options(container, all)).trim_end());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_get(
    container: &ServiceContainer,
    dir: &Path,
    path: &str,
    index: bool,
    lazy: bool,
) -> CliResult<()> {
    let dir = canonical_dir(container, dir)?;
    let mut tree = container.directory_tree(&dir)?;
    if lazy {
        tree.set_update_on_searching(true);
    }
    if !tree.update_on_searching() {
        tree.update_all()?;
    }

    let node = tree
        .get_node(path, !index)?
        .ok_or_else(|| CliError::NotFound(path.to_string()))?;
    print_node(&tree, node);
    Ok(())
}

fn print_node(tree: &Tree, node: NodeId) {
    if let Some(name_path) = tree.get_node_name_path(node) {
        output::action("path", &name_path);
    }
    if let Some(index_path) = tree.get_node_path(node) {
        output::action("index", &index_path);
    }
    if let Some(manager) = tree.get_node_manager(node) {
        output::action("manager", manager.label());
    }
    output::action("children", &tree.nodes().children(node).len());
    for (name, value) in tree.nodes().attributes(node) {
        output::detail(&format!("{} = {}", name, value));
    }
}

#[instrument(skip(container))]
fn cmd_layout(
    container: &ServiceContainer,
    layout: &str,
    path: Option<&str>,
    all: bool,
) -> CliResult<()> {
    let file = resolve_layout(container, layout)?;
    let service = container.layout_service();
    let mut tree = service.load_tree(&file, container.settings.update_on_searching)?;

    let from = match path {
        Some(p) => {
            if !tree.update_on_searching() {
                tree.update_all()?;
            }
            Some(
                tree.get_node(p, true)?
                    .ok_or_else(|| CliError::NotFound(p.to_string()))?,
            )
        }
        None => {
            tree.update_all()?;
            None
        }
    };
    output::info(tree.dump(from, dump_options(container, all)).trim_end());
    Ok(())
}

/// A layout argument is a file path, or a name looked up in `layout_dir`.
fn resolve_layout(container: &ServiceContainer, layout: &str) -> CliResult<PathBuf> {
    let direct = PathBuf::from(layout);
    if container.fs.exists(&direct) {
        return Ok(direct);
    }
    match &container.settings.layout_dir {
        Some(dir) => Ok(layout_file(dir, layout)),
        None => Err(CliError::Infra(InfraError::Application(
            ApplicationError::Config {
                message: format!("layout {} not found and no layout_dir configured", layout),
            },
        ))),
    }
}

fn cmd_config(command: &ConfigCommands, config_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(config_dir))?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(config_dir).display());
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
