//! tsconfig-style include/exclude patterns
//!
//! Each pattern is split into a literal directory prefix (where walking
//! starts) and a glob matched against paths relative to that prefix.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use super::paths::normalize_path;
use super::project::PatternList;
use crate::core::{ExplorerError, Result};

const WILDCARDS: &[char] = &['*', '?', '['];

/// A single compiled pattern
#[derive(Debug, Clone)]
pub struct FilePattern {
    root: PathBuf,
    globs: GlobSet,
}

impl FilePattern {
    /// Directory that must contain every match
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_match(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root)
            .map(|relative| self.globs.is_match(relative))
            .unwrap_or(false)
    }
}

/// Compiled include or exclude patterns
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    patterns: Vec<FilePattern>,
}

impl PatternMatcher {
    /// Compile include patterns: a bare directory matches every file under it
    pub fn include(list: &PatternList) -> Result<Self> {
        Self::compile(list, false)
    }

    /// Compile exclude patterns: a match also excludes everything beneath it
    pub fn exclude(list: &PatternList) -> Result<Self> {
        Self::compile(list, true)
    }

    fn compile(list: &PatternList, descend: bool) -> Result<Self> {
        let patterns = list
            .patterns
            .iter()
            .map(|pattern| compile_pattern(&list.base, pattern, descend))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[FilePattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(WILDCARDS)
}

fn compile_pattern(base: &Path, pattern: &str, descend: bool) -> Result<FilePattern> {
    let joined = normalize_path(&base.join(pattern));

    let mut root = PathBuf::new();
    let mut rest: Vec<String> = Vec::new();
    for component in joined.components() {
        let segment = component.as_os_str().to_string_lossy();
        let is_normal = matches!(component, Component::Normal(_));
        if rest.is_empty() && !(is_normal && has_wildcard(&segment)) {
            root.push(component);
        } else {
            rest.push(segment.into_owned());
        }
    }

    if rest.is_empty() {
        // Literal path: a file when the last segment has an extension
        let is_file = root.extension().is_some() && !root.is_dir();
        match (is_file, root.file_name().map(|n| n.to_string_lossy().into_owned())) {
            (true, Some(name)) => {
                root.pop();
                rest.push(name);
            }
            _ => rest.push("**/*".to_string()),
        }
    } else if let Some(last) = rest.last() {
        if !has_wildcard(last) && !last.contains('.') {
            rest.push("**/*".to_string());
        }
    }

    let glob = rest.join("/");
    let mut builder = GlobSetBuilder::new();
    builder.add(build_glob(pattern, &glob)?);
    if descend {
        builder.add(build_glob(pattern, &format!("{}/**", glob))?);
    }
    let globs = builder
        .build()
        .map_err(|e| ExplorerError::pattern(pattern, e.to_string()))?;

    Ok(FilePattern { root, globs })
}

fn build_glob(pattern: &str, glob: &str) -> Result<globset::Glob> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map_err(|e| ExplorerError::pattern(pattern, e.to_string()))
}
