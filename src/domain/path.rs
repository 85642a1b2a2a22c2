//! Textual node addressing.
//!
//! Two encodings are accepted:
//! - name paths: `/schemas/public/orders`, matched against each child's name
//! - index paths: `0:3:1`, flattened child positions at each level

use itertools::Itertools;

use crate::domain::error::{TreeError, TreeResult};

/// One step of a decoded path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Name(String),
    Index(usize),
}

/// Decodes `path` into segments; empty segments are dropped.
pub fn parse_path(path: &str, use_names: bool) -> TreeResult<Vec<Segment>> {
    if use_names {
        split_absolute_path(path)
    } else {
        split_indexed_path(path)
    }
}

fn split_absolute_path(path: &str) -> TreeResult<Vec<Segment>> {
    if !path.starts_with('/') {
        return Err(TreeError::PathFormat(format!(
            "name path must start with '/': {}",
            path
        )));
    }
    Ok(path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| Segment::Name(s.to_string()))
        .collect())
}

fn split_indexed_path(path: &str) -> TreeResult<Vec<Segment>> {
    if let Some(bad) = path.chars().find(|c| *c != ':' && !c.is_ascii_digit()) {
        return Err(TreeError::PathFormat(format!(
            "unexpected character {:?} in index path: {}",
            bad, path
        )));
    }
    path.split(':')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map(Segment::Index)
                .map_err(|e| TreeError::PathFormat(format!("{}: {}", path, e)))
        })
        .collect()
}

/// `[0, 3, 1]` → `"0:3:1"`.
pub fn format_index_path(positions: &[usize]) -> String {
    positions.iter().join(":")
}

/// `["a", "b"]` → `"/a/b"`.
pub fn format_name_path<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        return "/".to_string();
    }
    names.iter().map(|n| format!("/{}", n.as_ref())).collect()
}
