use clap::{ArgAction, Parser, Subcommand};
use compdb_build::{merge_files, CommandFilter, Config, MergeOutcome, PostBuildHook};
use miette::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compdb")]
#[command(
    author,
    version,
    about = "Prepare compile_commands.json for clang-tidy and editor tooling"
)]
struct Cli {
    /// Firmware project root (the directory holding build/)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Configuration file (default: <project-root>/compdb.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output; repeat for more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a clang-tidy copy with only project sources and no GCC-only flags
    Filter {
        /// Database to read
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the filtered database
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep entries whose path contains this (repeatable, replaces config)
        #[arg(long = "include", value_name = "SUBSTRING")]
        include: Vec<String>,

        /// Argument to strip (repeatable, replaces config)
        #[arg(long = "deny-flag", value_name = "FLAG", allow_hyphen_values = true)]
        deny_flags: Vec<String>,
    },

    /// Append the test runner's database to the firmware database
    Merge {
        /// Database that receives the entries and is overwritten
        #[arg(long)]
        primary: Option<PathBuf>,

        /// Database whose entries are appended
        #[arg(long)]
        secondary: Option<PathBuf>,
    },

    /// Print the PlatformIO extra-script that registers the post-build hook
    Hook {
        /// Write the script instead of printing it (default: helpers/compiledb.py)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        write: Option<Option<PathBuf>>,
    },

    /// Run the compilation database regeneration command now
    Regenerate,

    /// Print the effective configuration
    Config,
}

/// Initialize tracing subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::from_file(path)?,
        None => Config::discover(project_root)?,
    };
    Ok(config)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = cli.project_root.as_path();
    let mut config = load_config(root, cli.config.as_deref())?;
    let paths = config.paths.resolve(root);
    tracing::debug!(
        root = %root.display(),
        input = %paths.input.display(),
        filtered = %paths.filtered.display(),
        secondary = %paths.secondary.display(),
        "resolved paths"
    );

    match cli.command {
        Commands::Filter {
            input,
            output,
            include,
            deny_flags,
        } => {
            if !include.is_empty() {
                config.filter.include = include;
            }
            if !deny_flags.is_empty() {
                config.filter.deny_flags = deny_flags;
            }
            let input = input.unwrap_or(paths.input);
            let output = output.unwrap_or(paths.filtered);

            let report = CommandFilter::from_config(&config.filter).filter_file(&input, &output)?;
            println!(
                "Kept {} of {} entries ({} flags removed) -> {}",
                report.kept,
                report.read,
                report.flags_removed,
                output.display()
            );
        }

        Commands::Merge { primary, secondary } => {
            let primary = primary.unwrap_or(paths.input);
            let secondary = secondary.unwrap_or(paths.secondary);

            match merge_files(&primary, &secondary)? {
                MergeOutcome::Merged { .. } => {
                    println!(
                        "Merged {} into {}",
                        secondary.display(),
                        primary.display()
                    );
                }
                MergeOutcome::SecondaryMissing => {
                    println!("No {} found", secondary.display());
                }
            }
        }

        Commands::Hook { write } => {
            let hook = PostBuildHook::from_config(&config.hook);
            match write {
                Some(path) => {
                    let path = path.unwrap_or(paths.hook_script);
                    hook.install(&path)?;
                    println!(
                        "Wrote {}; add it to extra_scripts in platformio.ini",
                        path.display()
                    );
                }
                None => print!("{}", hook.script()?),
            }
        }

        Commands::Regenerate => {
            PostBuildHook::from_config(&config.hook).run(root)?;
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
