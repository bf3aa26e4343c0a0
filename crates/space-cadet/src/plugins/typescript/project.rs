//! Project configuration discovery and loading
//!
//! Finds the nearest `tsconfig.json` and resolves it, `extends` chain
//! included, into the file lists and options that drive program
//! construction.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::jsonc::strip_jsonc;
use super::paths::{is_relative_specifier, normalize_path, with_suffix};
use crate::core::{ExplorerError, Result, DEFAULT_VENDOR_DIRS};

/// Find `file_name` in `start` or the nearest ancestor directory
pub fn find_config_file(start: &Path, file_name: &str) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(file_name);
        trace!(candidate = %candidate.display(), "Checking for project configuration");
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(ExplorerError::config_not_found(start, file_name))
}

/// A list of file patterns and the directory they are relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternList {
    pub base: PathBuf,
    pub patterns: Vec<String>,
}

impl PatternList {
    pub fn new(base: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            base: base.into(),
            patterns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn specifiers(&self) -> Vec<&str> {
        match self {
            Extends::One(spec) => vec![spec.as_str()],
            Extends::Many(specs) => specs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    extends: Option<Extends>,
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    #[serde(default)]
    compiler_options: Map<String, Value>,
}

/// A fully resolved project configuration
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    path: PathBuf,
    files: Option<PatternList>,
    include: Option<PatternList>,
    exclude: Option<PatternList>,
    compiler_options: Map<String, Value>,
    out_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load the configuration at `path`, following `extends`
    pub fn load(path: &Path) -> Result<Self> {
        let path = normalize_path(path);
        let mut chain = Vec::new();
        let config = Self::load_chain(&path, &mut chain)?;
        debug!(
            config = %config.path.display(),
            allow_js = config.allow_js(),
            "Loaded project configuration"
        );
        Ok(config)
    }

    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            files: None,
            include: None,
            exclude: None,
            compiler_options: Map::new(),
            out_dir: None,
        }
    }

    fn load_chain(path: &Path, chain: &mut Vec<PathBuf>) -> Result<Self> {
        if chain.iter().any(|seen| seen == path) {
            return Err(ExplorerError::config_parse(
                path,
                format!("circular extends through {}", chain[0].display()),
            ));
        }
        chain.push(path.to_path_buf());

        let raw = read_raw_config(path)?;
        let dir = config_dir(path);
        let mut config = Self::empty(path);

        if let Some(extends) = &raw.extends {
            for spec in extends.specifiers() {
                let base_path = resolve_extends(&dir, spec).ok_or_else(|| {
                    ExplorerError::config_parse(path, format!("cannot find base config '{}'", spec))
                })?;
                trace!(base = %base_path.display(), "Resolved extends");
                let base = Self::load_chain(&base_path, chain)?;
                config.inherit(base);
            }
        }
        config.apply(raw, &dir);

        chain.pop();
        Ok(config)
    }

    fn inherit(&mut self, base: ProjectConfig) {
        if base.files.is_some() {
            self.files = base.files;
        }
        if base.include.is_some() {
            self.include = base.include;
        }
        if base.exclude.is_some() {
            self.exclude = base.exclude;
        }
        if base.out_dir.is_some() {
            self.out_dir = base.out_dir;
        }
        self.compiler_options.extend(base.compiler_options);
    }

    fn apply(&mut self, raw: RawConfig, dir: &Path) {
        if let Some(files) = raw.files {
            self.files = Some(PatternList::new(dir, files));
        }
        if let Some(include) = raw.include {
            self.include = Some(PatternList::new(dir, include));
        }
        if let Some(exclude) = raw.exclude {
            self.exclude = Some(PatternList::new(dir, exclude));
        }
        if let Some(out_dir) = raw.compiler_options.get("outDir").and_then(Value::as_str) {
            self.out_dir = Some(normalize_path(&dir.join(out_dir)));
        }
        self.compiler_options.extend(raw.compiler_options);
    }

    /// Path of the configuration file itself
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the configuration file
    pub fn dir(&self) -> PathBuf {
        config_dir(&self.path)
    }

    /// Explicit file list, if any
    pub fn files(&self) -> Option<&PatternList> {
        self.files.as_ref()
    }

    /// Include patterns, defaulting to everything when no file list is given
    pub fn include(&self) -> PatternList {
        match (&self.files, &self.include) {
            (_, Some(include)) => include.clone(),
            (None, None) => PatternList::new(self.dir(), vec!["**/*".to_string()]),
            (Some(_), None) => PatternList::new(self.dir(), Vec::new()),
        }
    }

    /// Exclude patterns, defaulting to vendor directories and `outDir`
    pub fn exclude(&self) -> PatternList {
        if let Some(exclude) = &self.exclude {
            return exclude.clone();
        }
        let mut patterns: Vec<String> = DEFAULT_VENDOR_DIRS.iter().map(|d| d.to_string()).collect();
        if let Some(out_dir) = &self.out_dir {
            patterns.push(out_dir.to_string_lossy().into_owned());
        }
        PatternList::new(self.dir(), patterns)
    }

    pub fn compiler_options(&self) -> &Map<String, Value> {
        &self.compiler_options
    }

    pub fn allow_js(&self) -> bool {
        self.compiler_options
            .get("allowJs")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }
}

fn config_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn read_raw_config(path: &Path) -> Result<RawConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| ExplorerError::config_parse(path, format!("cannot read file: {}", e)))?;
    let stripped = strip_jsonc(&content);
    if stripped.trim().is_empty() {
        return Ok(RawConfig::default());
    }
    serde_json::from_str(&stripped).map_err(|e| ExplorerError::config_parse(path, e.to_string()))
}

fn config_candidates(target: &Path) -> [PathBuf; 3] {
    [
        target.to_path_buf(),
        with_suffix(target, ".json"),
        target.join("tsconfig.json"),
    ]
}

/// Resolve an `extends` specifier relative to the extending config's directory
fn resolve_extends(dir: &Path, spec: &str) -> Option<PathBuf> {
    if is_relative_specifier(spec) || Path::new(spec).is_absolute() {
        let target = normalize_path(&dir.join(spec));
        return config_candidates(&target).into_iter().find(|p| p.is_file());
    }

    dir.ancestors().find_map(|ancestor| {
        let target = ancestor.join("node_modules").join(spec);
        config_candidates(&target).into_iter().find(|p| p.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_config_walks_upward() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("tsconfig.json"), "{}");
        let nested = dir.path().join("packages").join("app");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested, "tsconfig.json").unwrap();
        assert_eq!(found, dir.path().join("tsconfig.json"));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("tsconfig.json"), "{}");
        write(&dir.path().join("app").join("tsconfig.json"), "{}");

        let found = find_config_file(&dir.path().join("app"), "tsconfig.json").unwrap();
        assert_eq!(found, dir.path().join("app").join("tsconfig.json"));
    }

    #[test]
    fn test_defaults_without_files_or_include() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"compilerOptions": {"outDir": "dist"}}"#);

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.include().patterns, vec!["**/*".to_string()]);
        let exclude = config.exclude();
        assert!(exclude.patterns.contains(&"node_modules".to_string()));
        assert!(exclude
            .patterns
            .contains(&dir.path().join("dist").to_string_lossy().into_owned()));
        assert!(!config.allow_js());
    }

    #[test]
    fn test_files_without_include_disables_default_include() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"files": ["main.ts"]}"#);

        let config = ProjectConfig::load(&path).unwrap();
        assert!(config.include().is_empty());
        assert_eq!(config.files().unwrap().patterns, vec!["main.ts".to_string()]);
    }

    #[test]
    fn test_extends_inherits_relative_to_base() {
        let dir = tempdir().unwrap();
        write(
            &dir.path().join("configs").join("base.json"),
            r#"{
                // shared
                "include": ["../shared"],
                "compilerOptions": {"allowJs": true, "strict": true},
            }"#,
        );
        let path = dir.path().join("app").join("tsconfig.json");
        write(
            &path,
            r#"{"extends": "../configs/base", "compilerOptions": {"strict": false}}"#,
        );

        let config = ProjectConfig::load(&path).unwrap();
        let include = config.include();
        assert_eq!(include.base, dir.path().join("configs"));
        assert_eq!(include.patterns, vec!["../shared".to_string()]);
        assert!(config.allow_js());
        assert_eq!(config.compiler_options()["strict"], Value::Bool(false));
    }

    #[test]
    fn test_extends_from_node_modules() {
        let dir = tempdir().unwrap();
        write(
            &dir.path()
                .join("node_modules")
                .join("@tsconfig")
                .join("strict")
                .join("tsconfig.json"),
            r#"{"compilerOptions": {"allowJs": true}}"#,
        );
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"extends": "@tsconfig/strict"}"#);

        let config = ProjectConfig::load(&path).unwrap();
        assert!(config.allow_js());
    }

    #[test]
    fn test_extends_array_later_wins() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a.json"), r#"{"include": ["a"]}"#);
        write(&dir.path().join("b.json"), r#"{"include": ["b"]}"#);
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"extends": ["./a.json", "./b.json"]}"#);

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.include().patterns, vec!["b".to_string()]);
    }

    #[test]
    fn test_missing_base_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"extends": "./missing.json"}"#);

        let result = ProjectConfig::load(&path);
        assert!(matches!(result, Err(ExplorerError::ConfigParse { .. })));
    }

    #[test]
    fn test_circular_extends() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("a.json"), r#"{"extends": "./tsconfig.json"}"#);
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"extends": "./a.json"}"#);

        match ProjectConfig::load(&path) {
            Err(ExplorerError::ConfigParse { message, .. }) => {
                assert!(message.contains("circular"));
            }
            other => panic!("Expected circular extends error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");
        write(&path, r#"{"include": ["src" "lib"]}"#);

        let result = ProjectConfig::load(&path);
        assert!(matches!(result, Err(ExplorerError::ConfigParse { .. })));
    }
}
