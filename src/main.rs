use clap::{Parser, Subcommand};
use jcss::config::BuildConfig;
use jcss::workspace::{DiskWorkspace, Workspace};
use jcss::{config, output, pipeline};
use std::path::{Path, PathBuf};

/// Tagged release builds report the crate version; everything else
/// reports the short commit hash the binary was built from.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "jcss")]
#[command(about = "Combine @import trees of CSS into minified JS registration modules")]
#[command(long_about = "\
Combine @import trees of CSS into minified JS registration modules

For every configured entry point, jcss recursively inlines @import-ed
stylesheets into one flattened body, strips comments and @charset
declarations, collapses insignificant whitespace, rewrites relative
url(...) references into absolute URLs carrying a content-derived
?v=<token> cache-buster, and writes a single JS statement:

  jcssReg('pages/home', '@charset \"utf-8\";.x{color:red}');

Configuration lives in jcss.toml next to your CSS tree; all paths in it
are relative to the config file's directory. Run 'jcss gen-config' for a
fully documented starting point.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "jcss.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Combine and emit every configured target
    Build {
        /// Debug mode: debug version tokens, missing assets are fatal
        #[arg(long)]
        debug: bool,
    },
    /// Validate the config and entry points without writing anything
    Check,
    /// Print a stock jcss.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { debug } => {
            let mut config = BuildConfig::load(&cli.config)?;
            if debug {
                config.debug = true;
            }
            let workspace = DiskWorkspace::new(project_root(&cli.config));
            let report = pipeline::build(&workspace, &config)?;
            for line in output::format_build_output(&report) {
                println!("{line}");
            }
        }
        Command::Check => {
            let config = BuildConfig::load(&cli.config)?;
            let workspace = DiskWorkspace::new(project_root(&cli.config));
            let mut entries = 0;
            for target in &config.targets {
                for src in &target.src {
                    if src.contains('*') {
                        continue;
                    }
                    let entry = match &target.cwd {
                        Some(cwd) => jcss::paths::join_normalize(cwd, src),
                        None => src.clone(),
                    };
                    if !workspace.exists(&entry) {
                        return Err(format!("entry point not found: {entry}").into());
                    }
                    entries += 1;
                }
            }
            println!(
                "Config is valid: {} target(s), {} literal entry point(s)",
                config.targets.len(),
                entries
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Directory all project-relative paths resolve against: the config
/// file's parent, or the working directory for a bare filename.
fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    }
}
