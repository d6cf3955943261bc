// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::models::YouTubeConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &YouTubeConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Join an endpoint onto an API root and append query parameters.
///
/// The root may or may not end with a slash.
pub fn endpoint_url(base: &str, endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
    let mut root = base.trim_end_matches('/').to_string();
    root.push('/');
    let mut url = Url::parse(&root)?.join(endpoint)?;
    if !params.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}
