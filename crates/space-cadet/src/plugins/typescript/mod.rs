//! TypeScript extractor plugin
//!
//! Finds the project's `tsconfig.json`, builds the program it describes and
//! collects every class declaration outside vendor directories.

mod jsonc;
mod paths;
mod patterns;
mod program;
mod project;
mod syntax;

pub use jsonc::strip_jsonc;
pub use paths::{absolute_path, is_vendor_path, normalize_path};
pub use patterns::{FilePattern, PatternMatcher};
pub use program::{resolve_import, root_file_names, Program, SourceFile};
pub use project::{find_config_file, PatternList, ProjectConfig};
pub use syntax::{collect_class_names, module_specifiers, SourceParser};

use std::path::Path;

use tracing::{debug, info, span, trace, Level};

use crate::core::{ClassEntity, ExplorerConfig, Extractor, Result, Source};

/// Extractor for TypeScript (and, with `allowJs`, JavaScript) projects
#[derive(Debug, Clone, Default)]
pub struct TypeScriptExtractor {
    config: ExplorerConfig,
}

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExplorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Classes declared in one parsed file
    fn classes_in(&self, file: &SourceFile) -> Vec<ClassEntity> {
        let source = Source::new(file.path().to_string_lossy());
        collect_class_names(file.tree(), file.text())
            .into_iter()
            .map(|name| ClassEntity::new(name, source.clone()))
            .collect()
    }
}

impl Extractor for TypeScriptExtractor {
    fn extract(&self, project_root: &Path) -> Result<Vec<ClassEntity>> {
        let extract_span = span!(Level::INFO, "extract_classes", root = %project_root.display());
        let _enter = extract_span.enter();

        let root = paths::absolute_path(project_root)?;
        let config_path = find_config_file(&root, &self.config.config_file_name)?;
        debug!(config = %config_path.display(), "Found project configuration");

        let project = ProjectConfig::load(&config_path)?;
        let program = Program::build(&project, &self.config)?;

        let mut entities = Vec::new();
        for file in program.files() {
            if is_vendor_path(file.path(), &self.config) {
                trace!(path = %file.path().display(), "Skipping vendor file");
                continue;
            }
            let classes = self.classes_in(file);
            trace!(path = %file.path().display(), classes = classes.len(), "Collected classes");
            entities.extend(classes);
        }

        info!(
            classes = entities.len(),
            files = program.files().len(),
            "Extraction completed"
        );
        Ok(entities)
    }

    fn name(&self) -> &'static str {
        "typescript"
    }
}
