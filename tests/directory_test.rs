//! Directory trees over real temporary directories.

use std::fs;

use tempfile::TempDir;

use treemgr::application::services::{ATTRIBUTE_KIND, ATTRIBUTE_PATH};
use treemgr::config::Settings;
use treemgr::domain::{DumpOptions, Value};
use treemgr::infrastructure::di::ServiceContainer;
use treemgr::util::testing;

fn project() -> TempDir {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/domain")).unwrap();
    fs::create_dir_all(root.join("target/debug")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("Cargo.toml"), "[package]").unwrap();
    fs::write(root.join("src/lib.rs"), "").unwrap();
    fs::write(root.join("src/domain/tree.rs"), "").unwrap();
    temp
}

fn container(settings: Settings) -> ServiceContainer {
    ServiceContainer::new(settings).unwrap()
}

#[test]
fn given_project_when_dumping_then_ignored_entries_skipped_and_depth_limited() {
    let temp = project();
    let mut tree = container(Settings::default()).directory_tree(temp.path()).unwrap();

    tree.update_all().unwrap();
    let out = tree.dump(None, DumpOptions::default());

    assert!(out.contains("Cargo.toml"));
    assert!(out.contains("lib.rs"));
    assert!(out.contains("domain"));
    assert!(!out.contains("tree.rs"), "depth 2 stops above src/domain/*:\n{}", out);
    assert!(!out.contains("target"));
    assert!(!out.contains(".git"));
}

#[test]
fn given_file_added_when_refreshing_level_then_existing_nodes_kept() {
    let temp = project();
    let mut tree = container(Settings::default()).directory_tree(temp.path()).unwrap();
    tree.update_all().unwrap();
    let src = tree.find_node("/src", true).unwrap().unwrap();
    let lib = tree.find_node("/src/lib.rs", true).unwrap().unwrap();

    fs::write(temp.path().join("src/main.rs"), "").unwrap();
    tree.update_part(src).unwrap();

    assert_eq!(tree.find_node("/src/lib.rs", true).unwrap(), Some(lib));
    assert!(tree.find_node("/src/main.rs", true).unwrap().is_some());
    assert_eq!(
        tree.nodes().get_attribute(lib, ATTRIBUTE_KIND),
        Some(&Value::from("file"))
    );
    let expected = temp.path().join("src/lib.rs");
    assert_eq!(
        tree.nodes().get_attribute(lib, ATTRIBUTE_PATH),
        Some(&Value::from(expected.to_string_lossy().into_owned()))
    );
}

#[test]
fn given_lazy_search_when_resolving_deep_path_then_levels_populated_on_demand() {
    let temp = project();
    let settings = Settings {
        update_on_searching: true,
        max_depth: 3,
        ..Settings::default()
    };
    let mut tree = container(settings).directory_tree(temp.path()).unwrap();

    let node = tree.get_node("/src/domain/tree.rs", true).unwrap().unwrap();

    assert_eq!(tree.get_node_name_path(node).as_deref(), Some("/src/domain/tree.rs"));
    // siblings of the searched branch stay unexpanded
    let cargo = tree.find_node("/Cargo.toml", true).unwrap().unwrap();
    assert!(tree.nodes().children(cargo).is_empty());
}

#[test]
fn given_hidden_files_enabled_when_listing_then_dot_entries_shown_unless_ignored() {
    let temp = project();
    fs::write(temp.path().join(".env"), "").unwrap();
    let settings = Settings {
        show_hidden: true,
        max_depth: 1,
        ..Settings::default()
    };
    let mut tree = container(settings).directory_tree(temp.path()).unwrap();

    tree.update_all().unwrap();

    assert!(tree.find_node("/.env", true).unwrap().is_some());
    assert!(tree.find_node("/.git", true).unwrap().is_none());
}

#[test]
fn given_removed_directory_when_refreshing_then_error_and_tree_kept() {
    let temp = project();
    let mut tree = container(Settings::default()).directory_tree(temp.path()).unwrap();
    tree.update_all().unwrap();
    let before = tree.dump(None, DumpOptions::default());

    fs::remove_dir_all(temp.path()).unwrap();

    assert!(tree.update_all().is_err());
    assert_eq!(tree.dump(None, DumpOptions::default()), before);
    assert!(!temp.path().exists());
}
