use anyhow::{Context, Result};

use crate::{
    formula::Formula,
    install::config::{Settings, build_formula},
    runtime::Runtime,
};

/// Print the effective formula as JSON. The output can be edited (e.g. to
/// fill in checksums) and passed back with `--formula`.
#[tracing::instrument(skip(runtime, settings))]
pub fn show<R: Runtime>(runtime: R, settings: Settings) -> Result<()> {
    let formula = build_formula(&runtime, &settings)?;
    println!("{}", render_formula(&formula)?);
    Ok(())
}

pub fn render_formula(formula: &Formula) -> Result<String> {
    serde_json::to_string_pretty(formula).context("Failed to serialize formula")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Sha256Digest;
    use crate::runtime::MockRuntime;

    #[test]
    fn test_render_formula_round_trips_through_load() {
        let mut formula = Formula::default().with_version("0.4.1");
        formula.checksums.aarch64 = Some(Sha256Digest::of_bytes(b"sticks"));
        let json = render_formula(&formula).unwrap();

        assert!(json.contains("\"version\": \"0.4.1\""));
        assert!(json.contains("\"x86_64\": null"));

        let mut runtime = MockRuntime::new();
        let body = json.clone();
        runtime
            .expect_read_to_string()
            .returning(move |_| Ok(body.clone()));
        let loaded = Formula::load(&runtime, std::path::Path::new("formula.json")).unwrap();
        assert_eq!(loaded, formula);
    }
}
