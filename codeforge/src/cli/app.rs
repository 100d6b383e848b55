use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "codeforge",
    version,
    about = "Autonomous multi-agent code generation: requirement in, built and tested code out.",
    long_about = "codeforge drives an iterative generate -> build -> test loop across a set of \
small agents, carrying structured error context between attempts, until the result compiles \
and passes its own tests or the iteration budget runs out."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a `codeforge.toml` configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, build and test a single-file artifact from a requirement
    Generate(GenerateArgs),

    /// Scaffold a multi-file project and iterate generate/validate/build/test across it
    Scaffold(ScaffoldArgs),

    /// Inspect past generation sessions
    #[command(subcommand)]
    Sessions(SessionsCommand),

    /// List the built-in project templates
    #[command(subcommand)]
    Templates(TemplatesCommand),
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// List all saved sessions, most recently updated first
    List,

    /// Show the full persisted record for one session
    Show {
        /// The session id to load
        id: String,

        /// Print the raw pretty-printed JSON record instead of a summarized view
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List the built-in scaffold templates
    List,
}

/// One credential override in `KEY=VALUE` form, e.g. `--credential OPENWEATHER_API_KEY=abc123`.
#[derive(Debug, Clone)]
pub struct CredentialArg {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for CredentialArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) => Ok(CredentialArg { key: key.to_string(), value: value.to_string() }),
            None => Err(format!("expected KEY=VALUE, got '{s}'")),
        }
    }
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Requirement text. Omit to read it from --file instead.
    pub requirement: Option<String>,

    /// Read the requirement from a file instead of the command line
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Target language
    #[arg(short, long, value_enum, default_value_t = LanguageArg::Python)]
    pub language: LanguageArg,

    /// Maximum generate/build/test iterations (defaults to the configured value)
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Runtime credential, KEY=VALUE, repeatable
    #[arg(long = "credential", value_name = "KEY=VALUE")]
    pub credentials: Vec<CredentialArg>,

    /// Write the final generated file here instead of only the session directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't persist the session to disk
    #[arg(long)]
    pub no_persist: bool,
}

#[derive(Parser, Debug)]
pub struct ScaffoldArgs {
    /// Requirement text. Omit to read it from --file instead.
    pub requirement: Option<String>,

    /// Read the requirement from a file instead of the command line
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Name of the project to scaffold. If omitted, it's guessed from the requirement text
    /// (e.g. "...called my-service").
    #[arg(long)]
    pub project_name: Option<String>,

    /// Template to scaffold (see `codeforge templates list`)
    #[arg(long)]
    pub template: String,

    /// Target language
    #[arg(short, long, value_enum, default_value_t = LanguageArg::Python)]
    pub language: LanguageArg,

    /// Maximum generate/validate/build/test iterations (defaults to the configured value)
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Runtime credential, KEY=VALUE, repeatable
    #[arg(long = "credential", value_name = "KEY=VALUE")]
    pub credentials: Vec<CredentialArg>,

    /// Directory the project is scaffolded into (the project itself lands in a subdirectory
    /// named after --project-name)
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Don't persist the session to disk
    #[arg(long)]
    pub no_persist: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum LanguageArg {
    Python,
    Java,
}

impl From<LanguageArg> for codeforge_core::ProgrammingLanguage {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::Python => codeforge_core::ProgrammingLanguage::Python,
            LanguageArg::Java => codeforge_core::ProgrammingLanguage::Java,
        }
    }
}
