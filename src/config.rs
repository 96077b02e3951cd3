//! Backend endpoint configuration, resolved once at startup.

use anyhow::{Context, Result, bail};
use reqwest::Url;

/// Path of the REST API under the backend origin.
pub const API_PATH: &str = "/api/weblarek";

/// Path of product images under the backend origin.
pub const CONTENT_PATH: &str = "/content/weblarek";

/// Base URLs of the REST API and of the content (image) host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub cdn_url: String,
}

impl Endpoints {
    /// Use two explicit base URLs. Trailing slashes are dropped.
    pub fn new(api_url: &str, cdn_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: normalize(api_url).context("invalid API URL")?,
            cdn_url: normalize(cdn_url).context("invalid content URL")?,
        })
    }

    /// Derive both URLs from a single backend origin,
    /// e.g. `https://larek-api.nomoreparties.co`.
    pub fn from_origin(origin: &str) -> Result<Self> {
        let origin = origin.trim().trim_end_matches('/');
        Self::new(
            &format!("{origin}{API_PATH}"),
            &format!("{origin}{CONTENT_PATH}"),
        )
    }

    /// Resolve endpoints from an origin, with optional per-URL overrides.
    pub fn resolve(
        origin: Option<&str>,
        api_url: Option<&str>,
        cdn_url: Option<&str>,
    ) -> Result<Self> {
        let derived = origin.map(Self::from_origin).transpose()?;
        let api = api_url
            .map(str::to_string)
            .or_else(|| derived.as_ref().map(|d| d.api_url.clone()));
        let cdn = cdn_url
            .map(str::to_string)
            .or_else(|| derived.as_ref().map(|d| d.cdn_url.clone()));

        match (api, cdn) {
            (Some(api), Some(cdn)) => Self::new(&api, &cdn),
            _ => bail!("no backend configured: set --api-origin (or API_ORIGIN), or both --api-url and --cdn-url"),
        }
    }
}

fn normalize(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).with_context(|| format!("not a URL: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported scheme {} in {raw}", url.scheme());
    }
    Ok(trimmed.to_string())
}
