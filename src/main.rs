use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use sticks_installer::{
    commands,
    install::{InstallOptions, config::Settings},
    platform::Platform,
    runtime::RealRuntime,
};

/// sticks-installer - install prebuilt sticks binaries
///
/// Resolves the sticks release artifact for this machine, verifies it against
/// its published SHA-256 checksum when one is configured, and installs it as a
/// read-only executable.
///
/// If the GITHUB_TOKEN environment variable is set, it is sent with download
/// requests. Set RUST_LOG=info for progress details.
///
/// Examples:
///   sticks-installer install            # Install into ~/.local/bin
///   sticks-installer resolve --os macos --arch arm64
#[derive(Parser, Debug)]
#[command(author, version = env!("STICKS_INSTALLER_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory to install into (defaults to /usr/local/bin as root, ~/.local/bin otherwise)
    #[arg(long, env = "STICKS_BIN_DIR", value_name = "PATH", global = true)]
    bin_dir: Option<PathBuf>,

    /// JSON formula file overriding the built-in release configuration
    #[arg(long = "formula", env = "STICKS_FORMULA", value_name = "PATH", global = true)]
    formula_path: Option<PathBuf>,

    /// Download URL prefix, up to and excluding /v{version}
    #[arg(long, env = "STICKS_BASE_URL", value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Release version to install (e.g. 0.3.6)
    #[arg(long, env = "STICKS_RELEASE", value_name = "VERSION", global = true)]
    release: Option<String>,

    /// Operating system to resolve for, instead of the detected one
    #[arg(long, value_name = "OS", global = true)]
    os: Option<String>,

    /// CPU architecture to resolve for, instead of the detected one
    #[arg(long, value_name = "ARCH", global = true)]
    arch: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download, verify and install sticks
    Install(InstallArgs),

    /// Replace the installed sticks with the configured release
    Update(ChecksumArgs),

    /// Show which artifact would be installed, without downloading it
    Resolve,

    /// Run `sticks --version` against the installed binary
    Test,

    /// Remove the installed sticks binary
    Uninstall,

    /// Print the effective formula as JSON
    Formula,
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// Replace an existing installation
    #[arg(long, short = 'f')]
    force: bool,

    /// Run `sticks --version` after installing
    #[arg(long)]
    smoke_test: bool,

    #[command(flatten)]
    checksum: ChecksumArgs,
}

#[derive(clap::Args, Debug)]
struct ChecksumArgs {
    /// Fail instead of skipping verification when no checksum is configured
    #[arg(long, env = "STICKS_REQUIRE_CHECKSUM")]
    require_checksum: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            bin_dir: self.bin_dir.clone(),
            formula_path: self.formula_path.clone(),
            base_url: self.base_url.clone(),
            release: self.release.clone(),
        }
    }

    fn platform(&self) -> Platform {
        Platform::detect_with(self.os.clone(), self.arch.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let settings = cli.settings();
    let platform = cli.platform();

    match cli.command {
        Commands::Install(args) => {
            let options = InstallOptions {
                force: args.force,
                require_checksum: args.checksum.require_checksum,
            };
            commands::install(runtime, settings, &platform, options, args.smoke_test).await?;
        }
        Commands::Update(args) => {
            commands::update(runtime, settings, &platform, args.require_checksum).await?;
        }
        Commands::Resolve => commands::resolve(runtime, settings, &platform)?,
        Commands::Test => commands::test(runtime, settings)?,
        Commands::Uninstall => commands::uninstall(runtime, settings)?,
        Commands::Formula => commands::show(runtime, settings)?,
    }
    Ok(())
}
