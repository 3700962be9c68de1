use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::cli::{CheckArgs, CleanArgs, Cli, Command, ConfigCommand, InitArgs, TemplateArgs};
use crate::config::{self, TexkitConfig};
use crate::scaffold::template::TemplateDescription;
use crate::scaffold::{self, ScaffoldOptions};
use crate::walk::WalkOptions;
use crate::{cleanup, inputs, templates};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConfigSource {
    Explicit,
    Discovered,
    UserDefault,
    Builtin,
}

impl ConfigSource {
    fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Explicit => "explicit",
            ConfigSource::Discovered => "discovered",
            ConfigSource::UserDefault => "user-default",
            ConfigSource::Builtin => "builtin",
        }
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfigPath {
    /// `None` when no config file exists anywhere; builtin defaults apply.
    path: Option<Utf8PathBuf>,
    source: ConfigSource,
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from(&cli);
    ctx.apply_chdir()?;

    let _ = ctx.verbose;

    match cli.command {
        Command::Config { command } => handle_config_only(&ctx, command),
        Command::Template(args) => handle_template(&ctx, args),
        other => {
            let state = AppState::new(ctx)?;
            handle_with_state(&state, other)
        }
    }
}

fn handle_with_state(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Check(args) => handle_check(state, args),
        Command::Clean(args) => handle_clean(state, args),
        Command::Init(args) => handle_init(state, args),
        Command::Config { .. } | Command::Template(..) => {
            unreachable!("handled before config is loaded")
        }
    }
}

fn handle_check(state: &AppState, args: CheckArgs) -> Result<()> {
    let base = state.thesis_root();
    let scan_root = match args.root {
        Some(root) => utf8_arg(root, "scan root")?,
        None => base.clone(),
    };

    let options = WalkOptions {
        extensions: state.config.extensions(),
        ..WalkOptions::default()
    };
    let outcome = inputs::scan(&scan_root, &base, &options)?;

    for missing in &outcome.missing {
        println!(
            "{}:{}: \\input{{{}}} refers to {} which does not exist",
            missing.document, missing.line, missing.target, missing.resolved
        );
    }
    println!(
        "Checked {} documents, {} input statements, {} missing.",
        outcome.scanned,
        outcome.reference_count,
        outcome.missing.len()
    );
    if outcome.skipped > 0 {
        println!("Skipped {} unreadable documents.", outcome.skipped);
    }

    if args.orphans {
        let chapters = anchored(&base, state.config.chapters_dir());
        let main = anchored(&base, state.config.main_file());
        let orphans = inputs::orphans(&outcome, &chapters, &main);
        if orphans.is_empty() {
            println!("Every document under {} is referenced.", chapters);
        } else {
            println!("Documents never referenced by an \\input statement:");
            for orphan in orphans {
                println!("  - {}", orphan);
            }
        }
    }

    Ok(())
}

fn handle_clean(state: &AppState, args: CleanArgs) -> Result<()> {
    let root = match args.root {
        Some(root) => utf8_arg(root, "clean root")?,
        None => state.thesis_root(),
    };
    if !root.is_dir() {
        bail!("{} is not a directory", root);
    }

    let empty = cleanup::find_empty_dirs(&root)?;
    if empty.is_empty() {
        println!("No empty directories under {}.", root);
        return Ok(());
    }

    if args.delete == 0 {
        println!(
            "Empty directories under {} (rerun with --delete 1 to remove):",
            root
        );
        for dir in &empty {
            println!("  - {}", dir);
        }
        return Ok(());
    }

    if state.ctx.dry_run {
        println!("Empty directories under {} (dry-run, nothing deleted):", root);
        for dir in &empty {
            println!("  - {}", dir);
        }
        return Ok(());
    }

    // `find_empty_dirs` orders descendants first, so plain remove_dir
    // drains whole chains in a single run.
    let mut removed = 0usize;
    for dir in &empty {
        match fs::remove_dir(dir) {
            Ok(()) => {
                println!("  deleted {}", dir);
                removed += 1;
            }
            Err(err) => println!("  failed to delete {}: {}", dir, err),
        }
    }
    println!("Deleted {} of {} empty directories.", removed, empty.len());
    Ok(())
}

fn handle_init(state: &AppState, args: InitArgs) -> Result<()> {
    let base = state.thesis_root();
    if !base.is_dir() {
        bail!("thesis root {} does not exist", base);
    }
    let template_path = match args.template {
        Some(path) => utf8_arg(path, "template description")?,
        None => anchored(&base, state.config.template()),
    };
    let description = TemplateDescription::load(&template_path)?;

    let root = match args.root {
        Some(root) => utf8_arg(root, "output root")?,
        None => anchored(&base, state.config.chapters_dir()),
    };
    let options = ScaffoldOptions {
        placeholders: state.config.placeholders() && !args.no_placeholders,
        dry_run: state.ctx.dry_run,
    };

    println!("Scaffolding {} from {}", root, template_path);
    let report = scaffold::build(&root, &base, &description, options)?;

    let verb = if options.dry_run {
        "(dry-run) would create"
    } else {
        "created"
    };
    for dir in &report.created_dirs {
        println!("  {} {}/", verb, dir);
    }
    for file in &report.created_files {
        println!("  {} {}", verb, file);
    }
    if !report.skipped.is_empty() {
        println!("  kept {} existing entries", report.skipped.len());
    }
    for (path, reason) in &report.failed {
        println!("  failed {}: {}", path, reason);
    }

    if report.is_clean() {
        Ok(())
    } else {
        bail!("{} entries could not be created", report.failed.len())
    }
}

fn handle_template(ctx: &CliContext, args: TemplateArgs) -> Result<()> {
    let target = match args.path {
        Some(path) => utf8_arg(path, "template destination")?,
        None => Utf8PathBuf::from(config::DEFAULT_TEMPLATE),
    };
    if target.exists() && !args.force {
        bail!("{} already exists; rerun with --force to overwrite", target);
    }
    if ctx.dry_run {
        println!("(dry-run) would write template description to {}", target);
        return Ok(());
    }

    templates::write_example(&target, "chapter.example.json")?;
    println!("Wrote template description to {}", target);
    Ok(())
}

fn handle_config_only(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    let resolved = ctx.resolve_config_path()?;
    match command {
        Some(ConfigCommand::Path) => {
            match &resolved.path {
                Some(path) => println!("Config path: {} ({})", path, resolved.source.as_str()),
                None => println!("No config file found; builtin defaults apply."),
            }
            Ok(())
        }
        None | Some(ConfigCommand::Show) => {
            let Some(path) = &resolved.path else {
                println!("No config file found; showing builtin defaults.");
                println!("{}", config::format_summary(&TexkitConfig::default()));
                return Ok(());
            };
            if !path.exists() {
                println!("No config found at {}.", path);
                println!("Use `texkit config generate` to scaffold a default configuration.");
                return Ok(());
            }

            let config = config::load_from_path(path)?;
            println!("Config path: {} ({})", path, resolved.source.as_str());
            println!("{}", config::format_summary(&config));
            Ok(())
        }
        Some(ConfigCommand::Check) => {
            let Some(path) = &resolved.path else {
                bail!("no config file found to check");
            };
            let config = config::load_from_path(path)?;
            println!("Config OK: {} ({})", path, resolved.source.as_str());
            println!("{}", config::format_summary(&config));
            Ok(())
        }
        Some(ConfigCommand::Generate { path, force }) => {
            let target = match path {
                Some(path) => utf8_arg(path, "config destination")?,
                None => resolved
                    .path
                    .clone()
                    .unwrap_or_else(|| Utf8PathBuf::from("texkit.toml")),
            };
            if ctx.dry_run {
                println!("(dry-run) would write example config to {}", target);
                return Ok(());
            }
            config::write_example_config(&target, force)?;
            if force {
                println!("Overwrote config at {}", target);
            } else {
                println!("Wrote example config to {}", target);
            }
            Ok(())
        }
    }
}

fn utf8_arg(path: PathBuf, what: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| anyhow!("{} {} is not valid UTF-8", what, path.display()))
}

// Join that treats "." and "" as "stay here" instead of appending a dot
// component, so printed paths stay readable.
fn anchored(base: &Utf8Path, rel: &str) -> Utf8PathBuf {
    let joined = if rel.is_empty() || rel == "." {
        base.to_owned()
    } else {
        base.join(rel)
    };
    if joined.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        joined
    }
}

struct CliContext {
    chdir: Option<PathBuf>,
    file: Option<PathBuf>,
    dry_run: bool,
    verbose: u8,
}

impl CliContext {
    fn apply_chdir(&self) -> Result<()> {
        if let Some(path) = &self.chdir {
            std::env::set_current_dir(path)
                .with_context(|| format!("changing directory to {}", path.display()))?;
        }
        Ok(())
    }

    fn resolve_config_path(&self) -> Result<ResolvedConfigPath> {
        if let Some(path) = &self.file {
            let path = Utf8PathBuf::from_path_buf(path.clone())
                .map_err(|_| anyhow!("config path must be valid UTF-8"))?;
            return Ok(ResolvedConfigPath {
                path: Some(path),
                source: ConfigSource::Explicit,
            });
        }

        if let Ok(cwd) = std::env::current_dir() {
            if let Ok(dir) = Utf8PathBuf::from_path_buf(cwd) {
                if let Some(path) = discover_config_file(&dir) {
                    return Ok(ResolvedConfigPath {
                        path: Some(path),
                        source: ConfigSource::Discovered,
                    });
                }
            }
        }

        if let Some(dir) = dirs::config_dir() {
            let candidate = dir.join("texkit").join("config.toml");
            if candidate.exists() {
                let path = Utf8PathBuf::from_path_buf(candidate)
                    .map_err(|_| anyhow!("config path must be valid UTF-8"))?;
                return Ok(ResolvedConfigPath {
                    path: Some(path),
                    source: ConfigSource::UserDefault,
                });
            }
        }

        Ok(ResolvedConfigPath {
            path: None,
            source: ConfigSource::Builtin,
        })
    }
}

/// Walk towards the filesystem root looking for `texkit.toml`, falling back
/// to `.texkit/config.toml` at each level.
fn discover_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut dir = start.to_owned();
    loop {
        let preferred = dir.join("texkit.toml");
        if preferred.exists() {
            return Some(preferred);
        }

        let hidden = dir.join(".texkit").join("config.toml");
        if hidden.exists() {
            return Some(hidden);
        }

        let Some(parent) = dir.parent() else {
            return None;
        };
        dir = parent.to_path_buf();
    }
}

impl From<&Cli> for CliContext {
    fn from(cli: &Cli) -> Self {
        Self {
            chdir: cli.chdir.clone(),
            file: cli.file.clone(),
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        }
    }
}

struct AppState {
    ctx: CliContext,
    config_path: Option<Utf8PathBuf>,
    config: TexkitConfig,
}

impl AppState {
    fn new(ctx: CliContext) -> Result<Self> {
        let resolved = ctx.resolve_config_path()?;
        let config = match &resolved.path {
            Some(path) => config::load_from_path(path)?,
            None => TexkitConfig::default(),
        };
        Ok(Self {
            ctx,
            config_path: resolved.path,
            config,
        })
    }

    /// Directory configured relative paths hang off: the config file's
    /// parent joined with the configured root, or the working directory
    /// when no config file exists.
    fn thesis_root(&self) -> Utf8PathBuf {
        let anchor = self
            .config_path
            .as_deref()
            .and_then(Utf8Path::parent)
            .unwrap_or(Utf8Path::new("."));
        anchored(anchor, self.config.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    #[test]
    fn discovery_prefers_texkit_toml_over_hidden_dir() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        fs::create_dir_all(root.join(".texkit")).unwrap();
        fs::write(root.join(".texkit/config.toml"), "root = 'hidden'\n").unwrap();
        fs::write(root.join("texkit.toml"), "root = 'plain'\n").unwrap();

        let found = discover_config_file(&root).unwrap();
        assert_eq!(found, root.join("texkit.toml"));
    }

    #[test]
    fn discovery_walks_up_from_nested_directories() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        let nested = root.join("chapters/chapter1");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("texkit.toml"), "\n").unwrap();

        let found = discover_config_file(&nested).unwrap();
        assert_eq!(found, root.join("texkit.toml"));
    }

    #[test]
    fn discovery_gives_up_without_a_config() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        assert!(discover_config_file(&root).is_none());
    }

    #[test]
    fn explicit_file_wins_over_discovery() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        let explicit = root.join("elsewhere.toml");
        fs::write(&explicit, "root = 'x'\n").unwrap();

        let ctx = CliContext {
            chdir: None,
            file: Some(explicit.clone().into_std_path_buf()),
            dry_run: false,
            verbose: 0,
        };
        let resolved = ctx.resolve_config_path().unwrap();
        assert_eq!(resolved.source, ConfigSource::Explicit);
        assert_eq!(resolved.path, Some(explicit));
    }

    #[test]
    fn thesis_root_hangs_off_the_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        let config: TexkitConfig = toml::from_str("root = 'thesis'\n").unwrap();

        let state = AppState {
            ctx: CliContext {
                chdir: None,
                file: None,
                dry_run: false,
                verbose: 0,
            },
            config_path: Some(root.join("texkit.toml")),
            config,
        };
        assert_eq!(state.thesis_root(), root.join("thesis"));
    }

    #[test]
    fn thesis_root_defaults_to_the_working_directory() {
        let state = AppState {
            ctx: CliContext {
                chdir: None,
                file: None,
                dry_run: false,
                verbose: 0,
            },
            config_path: None,
            config: TexkitConfig::default(),
        };
        assert_eq!(state.thesis_root(), Utf8PathBuf::from("."));
    }

    #[test]
    fn anchored_skips_dot_components() {
        assert_eq!(anchored(Utf8Path::new("/a"), "."), Utf8PathBuf::from("/a"));
        assert_eq!(anchored(Utf8Path::new("/a"), "b"), Utf8PathBuf::from("/a/b"));
        assert_eq!(anchored(Utf8Path::new(""), "."), Utf8PathBuf::from("."));
        assert_eq!(anchored(Utf8Path::new(""), "b"), Utf8PathBuf::from("b"));
    }
}
