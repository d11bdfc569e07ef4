use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

pub struct HttpClient {
    pub client: ClientWithMiddleware,
}

#[derive(thiserror::Error, Debug)]
pub enum HttpError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("reqwest middleware error: {0}")]
    ReqwestMiddlewareError(#[from] reqwest_middleware::Error),
}

impl HttpClient {
    /// Transient failures (connection errors, 5xx, 408, 429) are retried up
    /// to three times. Other statuses are handed back to the caller untouched.
    pub fn new() -> reqwest::Result<HttpClient> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(HttpClient { client })
    }

    pub async fn fetch_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<(StatusCode, String), HttpError> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        Ok((status, body))
    }
}
