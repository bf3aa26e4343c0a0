//! Command-line interface for the space-cadet class explorer
//!
//! A terminal host for the explorer: scans a TypeScript project, renders
//! the class view and feeds display events back from stdin.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::table::{render_table, PrintOpener, TableDisplay};
use space_cadet::core::logging::{LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use space_cadet::plugins::typescript::{absolute_path, normalize_path, TypeScriptExtractor};
use space_cadet::session::{Explorer, ExplorerCommand, StateReconciler};
use space_cadet::{
    ClassEntity, Display, DisplayEvent, ExplorerConfig, Extractor, JsonFileStore,
    JsonLinesDisplay, KeyValueStore, MatchPolicy, Position,
};

/// Environment variable overriding the state file location
pub const STATE_ENV: &str = "SPACE_CADET_STATE";

/// Directory under the project root holding the default state file
pub const STATE_DIR: &str = ".space-cadet";

/// Space Cadet - explore the classes of a TypeScript project
#[derive(Parser)]
#[command(name = "space-cadet")]
#[command(about = "Find the classes of a TypeScript project and lay them out on a canvas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// State file (defaults to <root>/.space-cadet/state.json)
    #[arg(long, global = true, env = STATE_ENV)]
    pub state: Option<PathBuf>,

    /// How move events pick the class they relocate
    #[arg(long, global = true, value_enum, default_value_t = MatchPolicyChoice::FirstByPath)]
    pub match_policy: MatchPolicyChoice,

    /// Fail extraction when a source file has syntax errors
    #[arg(long, global = true)]
    pub strict: bool,

    /// Only scan the files named by the configuration
    #[arg(long, global = true)]
    pub no_follow_imports: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Log level and format, environment variables taking precedence
    pub fn log_settings(&self) -> (String, String) {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.log_level.as_str().to_string());
        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| self.log_format.as_str().to_string());
        (level, format)
    }
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the classes of the project and print them
    Scan {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open the explorer and render the class view
    Explore {
        /// Render format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// When to use colors in text output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,

        /// Read display events (one JSON object per line) from stdin
        #[arg(short, long)]
        interactive: bool,
    },

    /// Move a class to a new position
    Move {
        /// Source file of the class, relative to the root or absolute
        #[arg(long)]
        path: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Class name, used with --match-policy path-and-name
        #[arg(long)]
        name: Option<String>,
    },

    /// Extract again, keeping the positions of classes that still exist
    Refresh {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the persisted view-state
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget all persisted state
    Reset,
}

/// Move matching policies
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum MatchPolicyChoice {
    /// First class declared in the file
    #[default]
    FirstByPath,
    /// Class with the given name in the file
    PathAndName,
}

impl From<MatchPolicyChoice> for MatchPolicy {
    fn from(value: MatchPolicyChoice) -> Self {
        match value {
            MatchPolicyChoice::FirstByPath => MatchPolicy::FirstByPath,
            MatchPolicyChoice::PathAndName => MatchPolicy::PathAndName,
        }
    }
}

/// How the explorer renders state
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned table
    #[default]
    Text,
    /// One JSON document per render
    Json,
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Extraction result as printed by `scan --json`
#[derive(Serialize)]
struct ScanReport<'a> {
    root: &'a Path,
    count: usize,
    types: &'a [ClassEntity],
}

/// Main CLI application
pub struct SpaceCadetApp {
    config: ExplorerConfig,
}

impl SpaceCadetApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(ExplorerConfig::default())
    }

    pub fn with_config(config: ExplorerConfig) -> Self {
        Self { config }
    }

    fn build_config(cli: &Cli) -> ExplorerConfig {
        ExplorerConfig::default()
            .with_match_policy(cli.match_policy.into())
            .with_strict_syntax(cli.strict)
            .with_follow_imports(!cli.no_follow_imports)
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        self.config = Self::build_config(&cli);

        let root = absolute_path(cli.root.as_deref().unwrap_or(Path::new(".")))
            .context("Failed to resolve project root")?;
        let state = match cli.state {
            Some(path) => absolute_path(&path).context("Failed to resolve state file")?,
            None => default_state_path(&root),
        };

        if cli.verbose {
            eprintln!("space-cadet v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("Project root: {}", root.display());
            eprintln!("State file: {}", state.display());
        }

        match cli.command {
            Commands::Scan { json } => self.scan_command(&root, json, cli.verbose),
            Commands::Explore {
                format,
                color,
                interactive,
            } => self.explore_command(&root, &state, format, color, interactive),
            Commands::Move { path, x, y, name } => {
                self.move_command(&root, &state, &path, Position::new(x, y), name)
            }
            Commands::Refresh { json } => self.refresh_command(&root, &state, json),
            Commands::Show { json } => self.show_command(&root, &state, json),
            Commands::Reset => self.reset_command(&root, &state),
        }
    }

    /// Handle the scan command
    fn scan_command(&self, root: &Path, json: bool, verbose: bool) -> Result<()> {
        let extractor = TypeScriptExtractor::with_config(self.config.clone());
        let classes = extractor.extract(root)?;

        if verbose {
            eprintln!("Found {} classes", classes.len());
        }

        if json {
            let report = ScanReport {
                root,
                count: classes.len(),
                types: &classes,
            };
            self.write_output(&serde_json::to_string_pretty(&report)?)
        } else {
            let state = classes.into_iter().collect();
            self.write_output(&render_table(&state, Some(root), should_colorize(ColorChoice::Auto)))
        }
    }

    /// Handle the explore command
    fn explore_command(
        &self,
        root: &Path,
        state: &Path,
        format: OutputFormat,
        color: ColorChoice,
        interactive: bool,
    ) -> Result<()> {
        let reconciler = self.reconciler(state)?;
        let base = root.to_path_buf();
        let color = should_colorize(color);
        let mut explorer = Explorer::new(reconciler, Some(root.to_path_buf()), move || {
            display_for(format, &base, color)
        })
        .with_opener(PrintOpener);

        explorer.execute(ExplorerCommand::Explore)?;
        if interactive {
            let handled = feed_events(&mut explorer, io::stdin().lock())?;
            debug!(handled, "Input closed");
        }
        explorer.close();
        Ok(())
    }

    /// Handle the move command
    fn move_command(
        &self,
        root: &Path,
        state: &Path,
        path: &Path,
        position: Position,
        name: Option<String>,
    ) -> Result<()> {
        let target = normalize_path(&root.join(path));
        let target = target.to_string_lossy();

        let mut reconciler = self.reconciler(state)?;
        reconciler.ensure(Some(root));
        if reconciler.apply_move(&target, name.as_deref(), position)? {
            self.write_output(&format!("Moved {} to {}", target, position))
        } else {
            Err(anyhow!("No class found for {}", target))
        }
    }

    /// Handle the refresh command
    fn refresh_command(&self, root: &Path, state: &Path, json: bool) -> Result<()> {
        let reconciler = self.reconciler(state)?;
        let mut explorer = Explorer::new(reconciler, Some(root.to_path_buf()), || {
            Box::new(JsonLinesDisplay::new(io::sink())) as Box<dyn Display>
        });
        explorer.execute(ExplorerCommand::Refresh)?;

        let view = explorer.reconciler().state();
        if json {
            self.write_output(&serde_json::to_string_pretty(view)?)
        } else {
            self.write_output(&render_table(view, Some(root), should_colorize(ColorChoice::Auto)))
        }
    }

    /// Handle the show command
    fn show_command(&self, root: &Path, state: &Path, json: bool) -> Result<()> {
        let reconciler = self.reconciler(state)?;
        match reconciler.load()? {
            Some(view) if json => self.write_output(&serde_json::to_string_pretty(&view)?),
            Some(view) => {
                self.write_output(&render_table(&view, Some(root), should_colorize(ColorChoice::Auto)))
            }
            None => self.write_output(&format!("No saved state in {}", state.display())),
        }
    }

    /// Handle the reset command
    fn reset_command(&self, root: &Path, state: &Path) -> Result<()> {
        let reconciler = self.reconciler(state)?;
        let mut explorer = Explorer::new(reconciler, Some(root.to_path_buf()), || {
            Box::new(JsonLinesDisplay::new(io::sink())) as Box<dyn Display>
        });
        explorer.execute(ExplorerCommand::Reset)?;
        self.write_output(&format!("Cleared {}", state.display()))
    }

    fn reconciler(&self, state: &Path) -> Result<StateReconciler<JsonFileStore>> {
        let store = JsonFileStore::open(state)
            .with_context(|| format!("Failed to open state file '{}'", state.display()))?;
        Ok(StateReconciler::typescript(store, self.config.clone()))
    }

    /// Write a line of output to stdout
    pub fn write_output(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        if !content.is_empty() && !content.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }
}

impl Default for SpaceCadetApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Default state file for a project root
pub fn default_state_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join("state.json")
}

fn display_for(format: OutputFormat, base: &Path, color: bool) -> Box<dyn Display> {
    match format {
        OutputFormat::Text => Box::new(TableDisplay::new(io::stdout(), color).with_base(base)),
        OutputFormat::Json => Box::new(JsonLinesDisplay::new(io::stdout())),
    }
}

/// Determine if stdout output should be colorized
fn should_colorize(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            if std::env::var("NO_COLOR").is_ok() {
                return false;
            }
            crossterm::tty::IsTty::is_tty(&io::stdout())
        }
    }
}

/// Handle display events read one per line until the input ends
///
/// Malformed lines are logged and skipped. Returns how many events were
/// handled.
pub fn feed_events<S, R>(explorer: &mut Explorer<S>, input: R) -> Result<usize>
where
    S: KeyValueStore,
    R: BufRead,
{
    let mut handled = 0;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<DisplayEvent>(line) {
            Ok(event) => {
                explorer.handle_event(event)?;
                handled += 1;
            }
            Err(e) => warn!(line = index + 1, error = %e, "Skipping malformed event"),
        }
    }
    Ok(handled)
}
