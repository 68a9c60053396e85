//! Command-line interface for roster
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - Local subcommands (version, completion, config)
//! - Turning `list`/`export` arguments into filters and export requests

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, LogLevel, OutputFormat};
use crate::error::Result;
use crate::export::{
    DeliverySink, ExportFormat, ExportRequest, FileSink, FilterField, FilterSpec, StdoutSink,
};

pub mod commands;
pub mod completion;

/// Student record manager with filtered CSV and ZIP export
#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Student record manager backed by MongoDB",
    long_about = "Add and list student records, and export them (optionally filtered by name
or email) as CSV text or as a ZIP archive holding students.csv."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// MongoDB connection URI
    ///
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    #[arg(long, value_name = "URI", global = true)]
    pub uri: Option<String>,

    /// Database holding the records
    #[arg(long, value_name = "NAME", global = true)]
    pub database: Option<String>,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Subcommands; listing all records when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for roster
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add a student record
    Add {
        /// Student name
        #[arg(long)]
        name: String,

        /// Student email
        #[arg(long)]
        email: String,
    },

    /// List student records ordered by id
    List(ListArgs),

    /// Export student records as CSV or ZIP
    Export(ExportArgs),

    /// Check the connection to the record store
    Status,

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show version information
    Version,
}

/// Arguments of `roster list`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Case-insensitive substring of the name
    #[arg(long, value_name = "PATTERN")]
    pub name: Option<String>,

    /// Case-insensitive substring of the email
    #[arg(long, value_name = "PATTERN")]
    pub email: Option<String>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

/// Arguments of `roster export`
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportArgs {
    /// File format (csv, zip)
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// Keep records whose name contains PATTERN
    #[arg(long, value_name = "PATTERN")]
    pub name: Option<String>,

    /// Keep records whose email contains PATTERN
    #[arg(long, value_name = "PATTERN")]
    pub email: Option<String>,

    /// Export every record, ignoring --name and --email
    #[arg(long)]
    pub all: bool,

    /// Directory to write the file into
    #[arg(short = 'o', long, value_name = "DIR", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write the file content to stdout
    #[arg(long)]
    pub stdout: bool,
}

/// Build filter specs from optional name/email patterns
fn filters_from(name: Option<&str>, email: Option<&str>) -> Vec<FilterSpec> {
    [(FilterField::Name, name), (FilterField::Email, email)]
        .into_iter()
        .filter_map(|(field, pattern)| pattern.map(|p| FilterSpec::new(field, p)))
        .collect()
}

impl ListArgs {
    /// Filters given on the command line
    pub fn filters(&self) -> Vec<FilterSpec> {
        filters_from(self.name.as_deref(), self.email.as_deref())
    }
}

impl ExportArgs {
    /// Filters given on the command line
    pub fn filters(&self) -> Vec<FilterSpec> {
        filters_from(self.name.as_deref(), self.email.as_deref())
    }

    /// Build the export request
    ///
    /// `--name`/`--email` make the export filtered unless `--all` is set. A
    /// pattern given as an empty string still counts, so the request fails
    /// validation instead of silently exporting everything.
    ///
    /// # Arguments
    /// * `default_format` - Format used when `--format` is absent
    pub fn to_request(&self, default_format: ExportFormat) -> ExportRequest {
        let format = self.format.unwrap_or(default_format);
        let filters = self.filters();

        if self.all || filters.is_empty() {
            ExportRequest::all(format)
        } else {
            ExportRequest::filtered(filters, format)
        }
    }

    /// Sink receiving the finished payload
    pub fn sink(&self, config: &Config) -> Box<dyn DeliverySink> {
        if self.stdout {
            Box::new(StdoutSink)
        } else {
            let dir = self
                .output
                .clone()
                .unwrap_or_else(|| config.export.output_dir.clone());
            Box::new(FileSink::new(dir))
        }
    }
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file, environment and arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Effective configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        config.apply_env();
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
        Self::apply_connection_args(config, args);
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }

        if let Some(Commands::List(ListArgs {
            format: Some(format),
            ..
        })) = &args.command
        {
            config.display.format = *format;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Apply connection-related CLI arguments to configuration
    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        config.apply_overrides(args.uri.clone(), args.database.clone());
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Command to run; a bare `roster` lists every record
    pub fn command(&self) -> Commands {
        self.args
            .command
            .clone()
            .unwrap_or_else(|| Commands::List(ListArgs::default()))
    }

    /// Handle subcommands that do not need the record store
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("roster version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// Without flags the effective configuration is shown.
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate the effective configuration
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist, defaults are used");
        }

        self.config.validate()?;
        println!("Configuration is valid");
        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        println!("# Configuration file: {}", self.get_config_path().display());
        println!();
        print!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    pub fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(["roster"]).unwrap();
        assert!(args.uri.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_bare_command_lists() {
        assert_eq!(cli(&["roster"]).command(), Commands::List(ListArgs::default()));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from(["roster", "list", "--no-color", "-q"]).unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
    }

    #[test]
    fn test_add_requires_both_fields() {
        assert!(CliArgs::try_parse_from(["roster", "add", "--name", "Alice"]).is_err());
        let args =
            CliArgs::try_parse_from(["roster", "add", "--name", "Alice", "--email", "a@x.com"])
                .unwrap();
        assert_eq!(
            args.command,
            Some(Commands::Add {
                name: "Alice".to_string(),
                email: "a@x.com".to_string()
            })
        );
    }

    #[test]
    fn test_filtered_zip_export_request() {
        let args =
            CliArgs::try_parse_from(["roster", "export", "--name", "ali", "--format", "zip"])
                .unwrap();
        let Some(Commands::Export(export)) = args.command else {
            panic!("expected export command");
        };

        let request = export.to_request(ExportFormat::Csv);
        assert!(request.filtered);
        assert_eq!(request.format, ExportFormat::Zip);
        assert_eq!(request.filters, vec![FilterSpec::new(FilterField::Name, "ali")]);
        assert_eq!(request.filename(), "filtered_students.zip");
    }

    #[test]
    fn test_plain_export_request() {
        let args = CliArgs::try_parse_from(["roster", "export"]).unwrap();
        let Some(Commands::Export(export)) = args.command else {
            panic!("expected export command");
        };

        let request = export.to_request(ExportFormat::Csv);
        assert!(!request.filtered);
        assert_eq!(request.format, ExportFormat::Csv);
    }

    #[test]
    fn test_all_overrides_patterns() {
        let export = ExportArgs {
            name: Some("ali".to_string()),
            all: true,
            ..ExportArgs::default()
        };
        let request = export.to_request(ExportFormat::Zip);
        assert!(!request.filtered);
        assert_eq!(request.format, ExportFormat::Zip);
    }

    #[test]
    fn test_empty_pattern_stays_filtered() {
        let export = ExportArgs {
            email: Some(String::new()),
            ..ExportArgs::default()
        };
        assert!(export.to_request(ExportFormat::Csv).validate().is_err());
    }

    #[test]
    fn test_output_conflicts_with_stdout() {
        assert!(
            CliArgs::try_parse_from(["roster", "export", "--stdout", "--output", "/tmp"]).is_err()
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(CliArgs::try_parse_from(["roster", "export", "--format", "xlsx"]).is_err());
        assert!(CliArgs::try_parse_from(["roster", "list", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_args_override_config() {
        let cli = cli(&[
            "roster",
            "--uri",
            "mongodb://db:27017",
            "--database",
            "school",
            "-v",
            "--no-color",
            "list",
            "--format",
            "json",
        ]);
        let config = cli.config();
        assert_eq!(config.connection.uri, "mongodb://db:27017");
        assert_eq!(config.connection.database, "school");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.display.format, OutputFormat::Json);
        assert!(!config.display.color_output);
    }

    #[test]
    fn test_quiet_and_very_verbose() {
        assert_eq!(cli(&["roster", "-q"]).config().logging.level, LogLevel::Error);
        assert_eq!(
            cli(&["roster", "-q", "--vv"]).config().logging.level,
            LogLevel::Trace
        );
    }

    #[test]
    fn test_local_subcommands_are_handled() {
        assert!(cli(&["roster", "version"]).handle_subcommand().unwrap());
        assert!(!cli(&["roster", "status"]).handle_subcommand().unwrap());
        assert!(!cli(&["roster"]).handle_subcommand().unwrap());
    }
}
