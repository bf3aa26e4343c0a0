//! Program construction
//!
//! A program is the parsed set of source files for one project: the root
//! files named by the configuration plus whatever they import relatively.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, span, trace, warn, Level};
use tree_sitter::Tree;
use walkdir::{DirEntry, WalkDir};

use super::paths::{
    has_extension, is_hidden, is_relative_specifier, is_vendor_path, normalize_path,
    supported_extensions, with_suffix,
};
use super::patterns::PatternMatcher;
use super::project::ProjectConfig;
use super::syntax::{has_syntax_errors, module_specifiers, SourceParser};
use crate::core::{ExplorerConfig, ExplorerError, Result};

/// A parsed source file
pub struct SourceFile {
    path: PathBuf,
    text: String,
    tree: Tree,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn has_syntax_errors(&self) -> bool {
        has_syntax_errors(&self.tree)
    }
}

/// The parsed files of one project
pub struct Program {
    files: Vec<SourceFile>,
    root_count: usize,
}

impl Program {
    /// Discover, read and parse every file belonging to `project`
    pub fn build(project: &ProjectConfig, config: &ExplorerConfig) -> Result<Self> {
        let build_span = span!(Level::INFO, "build_program", config = %project.path().display());
        let _enter = build_span.enter();

        let roots = root_file_names(project, config)?;
        let root_count = roots.len();
        if roots.is_empty() {
            warn!("No input files found for project");
        }
        debug!(root_count, "Discovered root files");

        let extensions = supported_extensions(project.allow_js());
        let mut parser = SourceParser::new()?;
        let mut seen: HashSet<PathBuf> = roots.iter().cloned().collect();
        let mut queue: VecDeque<PathBuf> = roots.into();
        let mut files = Vec::new();

        while let Some(path) = queue.pop_front() {
            let file = read_source(&mut parser, &path)?;

            if file.has_syntax_errors() {
                if config.strict_syntax {
                    return Err(ExplorerError::parse_or_compile(&path, "syntax errors in source"));
                }
                warn!(path = %path.display(), "Source has syntax errors");
            }

            if config.follow_imports {
                for specifier in module_specifiers(file.tree(), file.text()) {
                    let Some(target) = resolve_import(&path, &specifier, &extensions) else {
                        trace!(specifier = %specifier, "Skipping non-relative or unresolved import");
                        continue;
                    };
                    if is_vendor_path(&target, config) {
                        trace!(target = %target.display(), "Skipping vendor import");
                        continue;
                    }
                    if seen.insert(target.clone()) {
                        trace!(from = %path.display(), target = %target.display(), "Following import");
                        queue.push_back(target);
                    }
                }
            }

            files.push(file);
        }

        info!(
            files = files.len(),
            imported = files.len() - root_count,
            "Program built"
        );
        Ok(Self { files, root_count })
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Number of files named by the configuration itself
    pub fn root_count(&self) -> usize {
        self.root_count
    }

    pub fn file_names(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(SourceFile::path)
    }
}

fn read_source(parser: &mut SourceParser, path: &Path) -> Result<SourceFile> {
    let text = fs::read_to_string(path).map_err(|source| ExplorerError::ReadSource {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = parser.parse(path, &text)?;
    trace!(path = %path.display(), bytes = text.len(), "Parsed source");
    Ok(SourceFile {
        path: path.to_path_buf(),
        text,
        tree,
    })
}

/// Root files: explicit `files` first, then include matches sorted by path
pub fn root_file_names(project: &ProjectConfig, config: &ExplorerConfig) -> Result<Vec<PathBuf>> {
    let mut roots = Vec::new();
    let mut seen = HashSet::new();

    if let Some(files) = project.files() {
        for name in &files.patterns {
            let path = normalize_path(&files.base.join(name));
            if !path.is_file() {
                warn!(path = %path.display(), "File listed in config does not exist");
                continue;
            }
            if seen.insert(path.clone()) {
                roots.push(path);
            }
        }
    }

    let include = PatternMatcher::include(&project.include())?;
    let exclude = PatternMatcher::exclude(&project.exclude())?;
    let extensions = supported_extensions(project.allow_js());

    let mut matched = BTreeSet::new();
    for pattern in include.patterns() {
        let walker = WalkDir::new(pattern.root())
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_entry(entry, config));
        for entry in walker.filter_map(|entry| entry.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = normalize_path(entry.path());
            if has_extension(&path, &extensions) && pattern.is_match(&path) && !exclude.is_match(&path) {
                matched.insert(path);
            }
        }
    }

    roots.extend(matched.into_iter().filter(|path| seen.insert(path.clone())));
    Ok(roots)
}

fn is_skipped_entry(entry: &DirEntry, config: &ExplorerConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    is_hidden(&name) || (entry.file_type().is_dir() && config.is_vendor_dir(&name))
}

/// TypeScript sources a JavaScript-style specifier may stand for
fn typescript_counterparts(extension: &str) -> &'static [&'static str] {
    match extension {
        "js" => &["ts", "tsx", "d.ts"],
        "jsx" => &["tsx"],
        "mjs" => &["mts", "d.mts"],
        "cjs" => &["cts", "d.cts"],
        _ => &[],
    }
}

/// Resolve a relative module specifier imported from `from`
pub fn resolve_import(from: &Path, specifier: &str, extensions: &[&str]) -> Option<PathBuf> {
    if !is_relative_specifier(specifier) {
        return None;
    }
    let dir = from.parent()?;
    let base = normalize_path(&dir.join(specifier));
    let mut candidates = Vec::new();

    if let (Some(stem), Some(ext)) = (
        base.file_stem(),
        base.extension().and_then(|ext| ext.to_str()),
    ) {
        for counterpart in typescript_counterparts(ext) {
            candidates.push(base.with_file_name(format!("{}.{}", stem.to_string_lossy(), counterpart)));
        }
    }
    if has_extension(&base, extensions) {
        candidates.push(base.clone());
    }
    let suffixes: Vec<&str> = extensions.iter().copied().chain(["d.ts"]).collect();
    for ext in &suffixes {
        candidates.push(with_suffix(&base, &format!(".{}", ext)));
    }
    for ext in &suffixes {
        candidates.push(base.join(format!("index.{}", ext)));
    }

    candidates.into_iter().find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_resolve_import_candidates() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/a.ts"));
        touch(&root.join("src/util/index.ts"));
        touch(&root.join("src/esm.ts"));
        touch(&root.join("src/view.tsx"));
        touch(&root.join("src/types.d.ts"));
        let from = root.join("src/main.ts");
        let exts = supported_extensions(false);

        assert_eq!(resolve_import(&from, "./a", &exts), Some(root.join("src/a.ts")));
        assert_eq!(resolve_import(&from, "./util", &exts), Some(root.join("src/util/index.ts")));
        assert_eq!(resolve_import(&from, "./esm.js", &exts), Some(root.join("src/esm.ts")));
        assert_eq!(resolve_import(&from, "./view", &exts), Some(root.join("src/view.tsx")));
        assert_eq!(resolve_import(&from, "./types", &exts), Some(root.join("src/types.d.ts")));
        assert_eq!(resolve_import(&from, "./missing", &exts), None);
        assert_eq!(resolve_import(&from, "lodash", &exts), None);
    }

    #[test]
    fn test_resolve_import_js_needs_allow_js() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("legacy.js"));
        let from = root.join("main.ts");

        assert_eq!(resolve_import(&from, "./legacy", &supported_extensions(false)), None);
        assert_eq!(
            resolve_import(&from, "./legacy", &supported_extensions(true)),
            Some(root.join("legacy.js"))
        );
    }
}
