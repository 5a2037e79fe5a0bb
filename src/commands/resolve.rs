use anyhow::Result;

use crate::{
    formula::Formula,
    install::config::{Settings, build_formula},
    platform::{Platform, Target},
    runtime::Runtime,
};

/// Print which artifact would be installed for `platform`, without
/// downloading anything.
#[tracing::instrument(skip(runtime, settings))]
pub fn resolve<R: Runtime>(runtime: R, settings: Settings, platform: &Platform) -> Result<()> {
    let formula = build_formula(&runtime, &settings)?;
    print!("{}", render_resolution(&formula, platform));
    Ok(())
}

pub fn render_resolution(formula: &Formula, platform: &Platform) -> String {
    let target = Target::resolve(platform);
    match formula.resolve(target) {
        Some(artifact) => {
            let checksum = artifact
                .checksum
                .as_ref()
                .map(|c| format!("sha256:{}", c))
                .unwrap_or_else(|| "none (verification skipped)".to_string());
            format!(
                "platform: {}\ntarget:   {}\nartifact: {}\nurl:      {}\nchecksum: {}\ninstalls: {}\n",
                platform, artifact.arch, artifact.file_name, artifact.url, checksum, formula.name
            )
        }
        None => {
            let published: Vec<String> = formula
                .artifacts()
                .into_iter()
                .map(|artifact| format!("{} ({})", artifact.file_name, artifact.arch))
                .collect();
            format!(
                "platform: {}\nartifact: none\npublished: {}\n",
                platform,
                published.join(", ")
            )
        }
    }
}
