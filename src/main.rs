use anyhow::Result;
use aarsync::commands::{OutputFormat, SyncOptions, lock_groups, sync};
use clap::Parser;
use std::path::PathBuf;

/// aarsync - Android library resolver
///
/// Resolve Maven packages, lock related package families onto a single
/// version and copy the resulting artifacts into a project directory.
///
/// If the AARSYNC_REPO_TOKEN environment variable is set, it is sent as a
/// bearer token to every remote repository.
///
/// Examples:
///   aarsync sync --packages "com.android.support:support-compat:26.0.1" --dest Plugins/Android
#[derive(Parser, Debug)]
#[command(author, version = env!("AARSYNC_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve packages and copy them into a directory
    Sync(SyncArgs),

    /// Show the built-in version lock groups
    LockGroups,
}

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// Semicolon-delimited package specifiers: group:artifact[:version][@type]
    #[arg(long, short = 'p', env = "AARSYNC_PACKAGES", value_name = "SPECS")]
    pub packages: String,

    /// Directory the artifacts are copied into
    #[arg(long, short = 'd', env = "AARSYNC_DEST", value_name = "PATH")]
    pub dest: PathBuf,

    /// Repository URL or local directory, searched in order (repeatable)
    #[arg(
        long = "repo",
        short = 'r',
        env = "AARSYNC_REPOS",
        value_name = "URL|PATH",
        value_delimiter = ','
    )]
    pub repositories: Vec<String>,

    /// Where remote artifacts are downloaded before copying
    #[arg(long, env = "AARSYNC_STAGING_DIR", value_name = "PATH")]
    pub staging_dir: Option<PathBuf>,

    /// JSON file with additional lock groups
    #[arg(long, value_name = "PATH")]
    pub lock_groups: Option<PathBuf>,

    /// Fail when any requested package is missing
    #[arg(long)]
    pub strict: bool,
}

impl From<SyncArgs> for SyncOptions {
    fn from(args: SyncArgs) -> Self {
        SyncOptions {
            packages: args.packages,
            dest: args.dest,
            repositories: args.repositories,
            staging_dir: args.staging_dir,
            lock_groups: args.lock_groups,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = aarsync::runtime::RealRuntime;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Commands::Sync(args) => {
            let strict = args.strict;
            sync(runtime, args.into(), format, strict).await?;
        }
        Commands::LockGroups => lock_groups(format)?,
    }
    Ok(())
}
