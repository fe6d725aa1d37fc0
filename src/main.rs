use anyhow::Result;
use clap::Parser;
use linkfarm::commands::{install, uninstall};
use std::path::PathBuf;

/// linkfarm - symlink-farm package installer
///
/// Mirrors a package's `pkgfiles` tree into a target root as relative
/// symlinks, and removes it again.
///
/// Examples:
///   linkfarm install ./tool              # Install ./tool into /
///   linkfarm install ./a ./b /opt        # Install two packages into /opt
///   linkfarm uninstall -t /opt ./a ./b   # Remove them again
#[derive(Parser, Debug)]
#[command(author, version = env!("LINKFARM_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Target root directory (every path is then a package; also via LINKFARM_TARGET)
    #[arg(
        long = "target",
        short = 't',
        env = "LINKFARM_TARGET",
        value_name = "PATH",
        global = true
    )]
    pub target: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Link packages into the target root
    Install(PathArgs),

    /// Remove the links of packages from the target root
    Uninstall(PathArgs),
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Package directories, optionally followed by the target root
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = linkfarm::runtime::RealRuntime;

    match cli.command {
        Commands::Install(args) => install(runtime, args.paths, cli.target)?,
        Commands::Uninstall(args) => uninstall(runtime, args.paths, cli.target)?,
    }
    Ok(())
}
