use anyhow::Result;
use log::debug;

use crate::{
    install::{
        InstallOptions, InstallOutcome, Installer,
        config::{Config, Settings},
        smoke_test,
    },
    platform::{Platform, Target},
    runtime::Runtime,
};

mod resolve;
mod show;

pub use resolve::{render_resolution, resolve};
pub use show::{render_formula, show};

fn installer<R: Runtime>(runtime: R, settings: Settings) -> Result<Installer<R>> {
    let config = Config::new(runtime, settings)?;
    Ok(Installer::new(
        config.runtime,
        config.http_client,
        config.formula,
        config.bin_dir,
    ))
}

/// Install the artifact for `platform`, then optionally run the smoke test.
///
/// An unsupported platform returns before any configuration is read.
#[tracing::instrument(skip(runtime, settings))]
pub async fn install<R: Runtime>(
    runtime: R,
    settings: Settings,
    platform: &Platform,
    options: InstallOptions,
    run_smoke_test: bool,
) -> Result<InstallOutcome> {
    if Target::resolve(platform) == Target::Unsupported {
        println!("   no prebuilt binary is published for {}, skipping", platform);
        return Ok(InstallOutcome::Skipped {
            platform: platform.clone(),
        });
    }

    let installer = installer(runtime, settings)?;
    let outcome = installer.install(platform, &options).await?;

    if let InstallOutcome::Installed { binary, .. } = &outcome {
        if run_smoke_test {
            smoke_test(&installer.runtime, &binary.path)?;
            println!("   {} --version succeeded", binary.path.display());
        }
    }
    Ok(outcome)
}

/// Reinstall over an existing binary. Behaves like a plain install when
/// nothing is installed yet.
#[tracing::instrument(skip(runtime, settings))]
pub async fn update<R: Runtime>(
    runtime: R,
    settings: Settings,
    platform: &Platform,
    require_checksum: bool,
) -> Result<InstallOutcome> {
    let options = InstallOptions {
        force: true,
        require_checksum,
    };
    debug!("Updating with {:?}", options);
    install(runtime, settings, platform, options, false).await
}

/// Remove the installed binary.
#[tracing::instrument(skip(runtime, settings))]
pub fn uninstall<R: Runtime>(runtime: R, settings: Settings) -> Result<()> {
    let installer = installer(runtime, settings)?;
    match installer.uninstall()? {
        Some(path) => println!("   removed {}", path.display()),
        None => println!(
            "   {} is not installed in {}",
            installer.formula.name,
            installer.bin_dir.display()
        ),
    }
    Ok(())
}

/// Run `sticks --version` against the installed binary.
#[tracing::instrument(skip(runtime, settings))]
pub fn test<R: Runtime>(runtime: R, settings: Settings) -> Result<()> {
    let installer = installer(runtime, settings)?;
    let path = installer.installed_path();
    smoke_test(&installer.runtime, &path)?;
    println!("   {} --version succeeded", path.display());
    Ok(())
}
