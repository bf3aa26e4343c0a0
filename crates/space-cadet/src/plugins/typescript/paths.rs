//! Path helpers shared by config loading and program construction

use std::path::{Component, Path, PathBuf};

use crate::core::{ExplorerConfig, Result};

/// TypeScript source extensions (`.d.ts` and friends are covered by these)
pub const TS_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];

/// Extensions added by `allowJs`
pub const JS_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

/// Supported extensions for a project
pub fn supported_extensions(allow_js: bool) -> Vec<&'static str> {
    let mut extensions = TS_EXTENSIONS.to_vec();
    if allow_js {
        extensions.extend_from_slice(JS_EXTENSIONS);
    }
    extensions
}

/// Whether `path` has one of `extensions`
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

/// Resolve `.` and `..` components without touching the file system
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Make `path` absolute against the working directory, then normalize it
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&std::env::current_dir()?.join(path)))
    }
}

/// Whether any directory component of `path` is a vendor directory
pub fn is_vendor_path(path: &Path, config: &ExplorerConfig) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(|name| config.is_vendor_dir(name)),
        _ => false,
    })
}

/// `./x`, `../x`, `.` or `..`; everything else resolves through packages
pub fn is_relative_specifier(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../") || spec == "." || spec == ".."
}

/// Whether a file or directory name is hidden
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Append a suffix to the final component (`base` + `.json`)
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}
