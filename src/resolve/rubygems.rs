//! RubyGems registry resolution

use crate::resolve::Resolution;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GemInfo {
    #[serde(default)]
    source_code_uri: Option<String>,
}

/// Looks up a gem's source repository through the RubyGems API
pub async fn resolve(http: &Client, base: &str, name: &str) -> Resolution {
    let url = format!("{}/{}.json", base, name);

    let response = match http.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("rubygems lookup failed for {}: {}", name, e);
            return Resolution::default();
        }
    };
    if !response.status().is_success() {
        return Resolution::default();
    }

    let info: GemInfo = match response.json().await {
        Ok(i) => i,
        Err(e) => {
            tracing::debug!("rubygems response for {} was not parseable: {}", name, e);
            return Resolution::default();
        }
    };

    let mut resolution = Resolution::default();
    if let Some(uri) = info.source_code_uri {
        if uri.len() > 5 {
            resolution.repo_urls.push(uri);
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::build_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_source_code_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sidekiq.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"source_code_uri": "https://github.com/acme/sidekiq"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let resolution = resolve(&http, &server.uri(), "sidekiq").await;
        assert_eq!(
            resolution.repo_urls,
            vec!["https://github.com/acme/sidekiq".to_string()]
        );
    }

    #[tokio::test]
    async fn test_resolve_null_uri_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mystery.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"source_code_uri": null}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let resolution = resolve(&http, &server.uri(), "mystery").await;
        assert!(resolution.repo_urls.is_empty());
    }
}
