use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI definition for the thesis maintenance workflows.
#[derive(Parser, Debug)]
#[command(name = "texkit", version, about = "Maintenance workflows for LaTeX thesis projects")]
pub struct Cli {
    #[arg(short = 'C', long = "chdir")]
    pub chdir: Option<PathBuf>,
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,
    #[arg(short = 'n', long = "dry-run", global = true)]
    pub dry_run: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify that files referenced by \input{} statements exist.
    Check(CheckArgs),
    /// Report or delete recursively empty directories.
    Clean(CleanArgs),
    /// Scaffold chapter/section/subsection directories from a template description.
    Init(InitArgs),
    /// Write the example template description for adaptation.
    Template(TemplateArgs),
    /// Configuration display, validation, and template generation.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Directory to scan. Defaults to the configured thesis root.
    #[arg()]
    pub root: Option<PathBuf>,

    /// Also report chapter documents no \input{} statement references.
    #[arg(long = "orphans", default_value_t = false)]
    pub orphans: bool,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory to clean. Defaults to the configured thesis root.
    #[arg()]
    pub root: Option<PathBuf>,

    /// Delete the empty directories (1) or only print them (0).
    #[arg(long = "delete", value_parser = clap::value_parser!(u8).range(0..=1), default_value_t = 0)]
    pub delete: u8,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output root for the chapter tree. Defaults to the configured chapters directory.
    #[arg()]
    pub root: Option<PathBuf>,

    /// Template description file. Defaults to the configured path under the thesis root.
    #[arg(short = 't', long = "template")]
    pub template: Option<PathBuf>,

    /// Create directories only, no placeholder .tex files.
    #[arg(long = "no-placeholders", default_value_t = false)]
    pub no_placeholders: bool,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Destination path. Defaults to `chapter.json` in the current directory.
    #[arg()]
    pub path: Option<PathBuf>,

    #[arg(long = "force", default_value_t = false)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Path,
    Check,
    Generate {
        #[arg()]
        path: Option<PathBuf>,
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}
