//! Startup glue: run generation only when the service is a local
//! development instance.

use std::env;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::Result;

static LOCALHOST_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://localhost[:/]").expect("localhost pattern is a valid regex")
});

/// True for a `Development` environment listening on localhost.
pub fn is_local_development(environment: &str, urls: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("development") && LOCALHOST_URL.is_match(urls)
}

/// Calls [`crate::generate`] when `DTS_FORGE_ENV` (or `APP_ENV`) and
/// `APP_URLS` describe a local development instance. Returns whether
/// generation ran.
pub fn generate_if_local_dev(output_root: impl AsRef<Path>) -> Result<bool> {
    let environment = env::var("DTS_FORGE_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_default();
    let urls = env::var("APP_URLS").unwrap_or_default();

    if !is_local_development(&environment, &urls) {
        debug!(%environment, %urls, "not a local development instance, skipping generation");
        return Ok(false);
    }

    info!(root = %output_root.as_ref().display(), "generating TypeScript declarations");
    crate::generate(output_root)?;
    Ok(true)
}
