//! Feed download.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::FeedCalConfig;
use crate::error::FeedCalResult;

/// HTTP client bound to the configured feed URL.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    pub fn new(config: &FeedCalConfig) -> FeedCalResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(FeedClient {
            http,
            url: config.feed_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the feed body. Any non-2xx status is an error.
    pub async fn fetch(&self) -> FeedCalResult<String> {
        debug!(url = %self.url, "Downloading feed");

        let response = self.http.get(&self.url).send().await?.error_for_status()?;
        let body = response.text().await?;

        info!(bytes = body.len(), "Downloaded feed");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedCalError;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> FeedCalConfig {
        FeedCalConfig {
            feed_url: format!("{}/events.xml", server.uri()),
            ..FeedCalConfig::default()
        }
    }

    #[tokio::test]
    async fn sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.xml"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = FeedClient::new(&config_for(&server)).unwrap();
        assert_eq!(client.fetch().await.unwrap(), "<rss/>");
    }

    #[tokio::test]
    async fn error_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = FeedClient::new(&config_for(&server)).unwrap();
        assert!(matches!(client.fetch().await, Err(FeedCalError::Fetch(_))));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<rss/>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = FeedCalConfig {
            timeout_secs: 1,
            ..config_for(&server)
        };
        let client = FeedClient::new(&config).unwrap();
        assert!(client.fetch().await.is_err());
    }
}
