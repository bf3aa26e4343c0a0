//! Explorer configuration
//!
//! Everything here has a sensible default; hosts override individual
//! settings with the `with_*` builders.

use std::fmt;
use std::str::FromStr;

/// Default build configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "tsconfig.json";

/// Default key under which the view-state is persisted
pub const DEFAULT_STATE_KEY: &str = "state";

/// Directories holding fetched third-party sources
pub const DEFAULT_VENDOR_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// How a move event picks the entity it relocates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MatchPolicy {
    /// First entity whose source path matches; the class name is ignored
    #[default]
    FirstByPath,
    /// Entity matching both path and class name, when the event names one
    PathAndName,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::FirstByPath => write!(f, "first-by-path"),
            MatchPolicy::PathAndName => write!(f, "path-and-name"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-by-path" | "path" => Ok(MatchPolicy::FirstByPath),
            "path-and-name" | "name" => Ok(MatchPolicy::PathAndName),
            _ => Err(format!("Unknown match policy: {}", s)),
        }
    }
}

/// Settings for extraction and reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// File name searched for at and above the project root
    pub config_file_name: String,
    /// Directory names excluded from extraction wherever they appear
    pub vendor_dirs: Vec<String>,
    /// Store key holding the persisted view-state
    pub state_key: String,
    pub match_policy: MatchPolicy,
    /// Fail extraction on syntax errors instead of warning
    pub strict_syntax: bool,
    /// Pull relatively imported files into the program
    pub follow_imports: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            config_file_name: DEFAULT_CONFIG_FILE.to_string(),
            vendor_dirs: DEFAULT_VENDOR_DIRS.iter().map(|dir| dir.to_string()).collect(),
            state_key: DEFAULT_STATE_KEY.to_string(),
            match_policy: MatchPolicy::default(),
            strict_syntax: false,
            follow_imports: true,
        }
    }
}

impl ExplorerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file_name(mut self, name: impl Into<String>) -> Self {
        self.config_file_name = name.into();
        self
    }

    pub fn with_vendor_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vendor_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_state_key(mut self, key: impl Into<String>) -> Self {
        self.state_key = key.into();
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_strict_syntax(mut self, strict: bool) -> Self {
        self.strict_syntax = strict;
        self
    }

    pub fn with_follow_imports(mut self, follow: bool) -> Self {
        self.follow_imports = follow;
        self
    }

    /// Whether a directory name is a vendor directory
    pub fn is_vendor_dir(&self, name: &str) -> bool {
        self.vendor_dirs.iter().any(|dir| dir == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExplorerConfig::default();
        assert_eq!(config.config_file_name, "tsconfig.json");
        assert_eq!(config.state_key, "state");
        assert_eq!(config.match_policy, MatchPolicy::FirstByPath);
        assert!(config.follow_imports);
        assert!(!config.strict_syntax);
        assert!(config.is_vendor_dir("node_modules"));
        assert!(!config.is_vendor_dir("src"));
    }

    #[test]
    fn test_builders() {
        let config = ExplorerConfig::new()
            .with_config_file_name("jsconfig.json")
            .with_vendor_dirs(["vendor"])
            .with_state_key("layout")
            .with_match_policy(MatchPolicy::PathAndName)
            .with_strict_syntax(true)
            .with_follow_imports(false);
        assert_eq!(config.config_file_name, "jsconfig.json");
        assert!(config.is_vendor_dir("vendor"));
        assert!(!config.is_vendor_dir("node_modules"));
        assert_eq!(config.state_key, "layout");
        assert_eq!(config.match_policy, MatchPolicy::PathAndName);
        assert!(config.strict_syntax);
        assert!(!config.follow_imports);
    }

    #[test]
    fn test_match_policy_parsing() {
        assert_eq!("first-by-path".parse::<MatchPolicy>().unwrap(), MatchPolicy::FirstByPath);
        assert_eq!("PATH-AND-NAME".parse::<MatchPolicy>().unwrap(), MatchPolicy::PathAndName);
        assert!("closest".parse::<MatchPolicy>().is_err());
        assert_eq!(MatchPolicy::PathAndName.to_string(), "path-and-name");
    }
}
