use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;

use crate::{formula::Formula, http::HttpClient, runtime::Runtime};

use super::paths::resolve_bin_dir;

/// User-supplied overrides, typically straight from the command line.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub bin_dir: Option<PathBuf>,
    pub formula_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub release: Option<String>,
}

/// Everything an install needs, assembled once at startup.
pub struct Config<R: Runtime> {
    pub runtime: R,
    pub http_client: HttpClient,
    pub formula: Formula,
    pub bin_dir: PathBuf,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, settings: Settings) -> Result<Self> {
        let formula = build_formula(&runtime, &settings)?;
        let bin_dir = resolve_bin_dir(&runtime, settings.bin_dir)?;
        let http_client = HttpClient::new(build_client(&runtime)?);

        Ok(Self {
            runtime,
            http_client,
            formula,
            bin_dir,
        })
    }
}

/// Defaults, then the formula file, then individual overrides.
pub fn build_formula<R: Runtime>(runtime: &R, settings: &Settings) -> Result<Formula> {
    let mut formula = match &settings.formula_path {
        Some(path) => Formula::load(runtime, path)?,
        None => Formula::default(),
    };
    if let Some(release) = &settings.release {
        formula = formula.with_version(release);
    }
    if let Some(base_url) = &settings.base_url {
        formula = formula.with_base_url(base_url);
    }
    formula.validate()?;
    debug!("Effective formula: {:?}", formula);
    Ok(formula)
}

fn build_client<R: Runtime>(runtime: &R) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Ok(token) = runtime.env_var("GITHUB_TOKEN") {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        debug!("Using GITHUB_TOKEN for authentication: {}", mask_token(&token));
    }

    let client = Client::builder()
        .user_agent(concat!("sticks-installer/", env!("STICKS_INSTALLER_VERSION")))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::test_bin_dir;
    use mockall::predicate::eq;
    use mockito::{Matcher, Server};

    /// Verify the Authorization header is sent only when GITHUB_TOKEN is set.
    async fn verify_authorization_header(token: Option<&str>) {
        let mut runtime = MockRuntime::new();
        let token_clone = token.map(|t| t.to_string());
        runtime
            .expect_env_var()
            .with(eq("GITHUB_TOKEN"))
            .returning(move |_| token_clone.clone().ok_or(std::env::VarError::NotPresent));

        let mut server = Server::new_async().await;
        let matcher = match token {
            Some(t) => Matcher::Exact(format!("Bearer {}", t)),
            None => Matcher::Missing,
        };
        let mock = server
            .mock("GET", "/")
            .match_header("Authorization", matcher)
            .create_async()
            .await;

        let settings = Settings {
            bin_dir: Some(test_bin_dir()),
            ..Default::default()
        };
        let config = Config::new(runtime, settings).unwrap();
        let _ = config.http_client.inner().get(server.url()).send().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_config_new_with_github_token() {
        verify_authorization_header(Some("ghp_0123456789abcdef")).await;
    }

    #[tokio::test]
    async fn test_config_new_without_github_token() {
        verify_authorization_header(None).await;
    }

    #[test]
    fn test_build_formula_overrides_apply_after_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"version": "0.4.0", "base_url": "https://mirror/dl"}"#.into()));

        let settings = Settings {
            formula_path: Some(PathBuf::from("formula.json")),
            release: Some("v0.5.0".into()),
            ..Default::default()
        };
        let formula = build_formula(&runtime, &settings).unwrap();

        assert_eq!(formula.version, "0.5.0");
        assert_eq!(formula.base_url, "https://mirror/dl");
    }

    #[test]
    fn test_build_formula_rejects_empty_overrides() {
        let runtime = MockRuntime::new();

        let settings = Settings {
            release: Some(String::new()),
            ..Default::default()
        };
        let err = build_formula(&runtime, &settings).unwrap_err();
        assert!(err.to_string().contains("version must not be empty"));

        let settings = Settings {
            base_url: Some(String::new()),
            ..Default::default()
        };
        let err = build_formula(&runtime, &settings).unwrap_err();
        assert!(err.to_string().contains("base_url must not be empty"));
    }

    #[test]
    fn test_build_formula_defaults() {
        let runtime = MockRuntime::new();
        let formula = build_formula(&runtime, &Settings::default()).unwrap();
        assert_eq!(formula, Formula::default());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*********");
        assert_eq!(mask_token("ghp_0123456789abcdef"), "ghp_0123*********cdef");
    }
}
