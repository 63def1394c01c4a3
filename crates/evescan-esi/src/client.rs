//! ESI client implementation.
//!
//! A single logical request retries on rate limiting (429), transient server
//! failures (502/503/504), and a near-exhausted error-limit budget, with
//! uncapped exponential backoff between attempts. Any other non-2xx status is
//! terminal and surfaces immediately. After the attempt budget is exhausted
//! the client issues one final unconditional request and surfaces whatever
//! that produces; a success from it is returned as a success.

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use evescan_core::{ContractId, RegionId};

use crate::config::EsiConfig;
use crate::error::{FetchError, FetchResult};

/// Header reporting how many errors remain before the API throttles us.
pub const ERROR_LIMIT_HEADER: &str = "X-ESI-Error-Limit-Remain";

/// Header reporting the total page count of a paginated listing.
pub const PAGES_HEADER: &str = "X-Pages";

/// One page of the public contract listing.
#[derive(Debug, Clone)]
pub struct ContractPage {
    /// Raw contract records exactly as returned by the server.
    pub records: Vec<Value>,
    /// Total page count reported by this response.
    pub total_pages: u32,
}

/// Client for the ESI public contract endpoints.
///
/// Stateless between calls and cheap to clone; the underlying HTTP client is
/// shared. Safe to use from several region workers at once — the retry policy
/// is what keeps a single upstream from being hammered.
#[derive(Debug, Clone)]
pub struct EsiClient {
    config: EsiConfig,
    http: Client,
}

impl EsiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EsiConfig) -> FetchResult<Self> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &EsiConfig {
        &self.config
    }

    /// Fetch one page of public contracts for a region.
    ///
    /// Returns the raw records plus the total page count from the `X-Pages`
    /// header (absent header means a single page).
    pub async fn fetch_public_contracts(
        &self,
        region: RegionId,
        page: u32,
    ) -> FetchResult<ContractPage> {
        let url = format!("{}/contracts/public/{}/", self.config.base_url, region);
        let response = self
            .get_with_retry(&url, &[("page", page.to_string())])
            .await?;

        let total_pages = response
            .headers()
            .get(PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let records: Vec<Value> = response.json().await?;
        Ok(ContractPage {
            records,
            total_pages,
        })
    }

    /// Fetch the item list of one public contract.
    pub async fn fetch_contract_items(&self, contract: ContractId) -> FetchResult<Vec<Value>> {
        let url = format!(
            "{}/contracts/public/items/{}/",
            self.config.base_url, contract
        );
        let response = self.get_with_retry(&url, &[]).await?;
        Ok(response.json().await?)
    }

    fn request(&self, url: &str, query: &[(&str, String)]) -> RequestBuilder {
        let mut builder = self.http.get(url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder
    }

    /// GET with the bounded retry/backoff policy.
    ///
    /// Transport failures propagate immediately; only status-level conditions
    /// consume retry budget.
    async fn get_with_retry(&self, url: &str, query: &[(&str, String)]) -> FetchResult<Response> {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            debug!(url, attempt, "sending request");
            let response = self.request(url, query).send().await?;
            let status = response.status();
            let remain = error_limit_remain(&response);

            if status.is_success() {
                return Ok(response);
            }

            if !is_retryable(status, remain) {
                return Err(FetchError::Terminal {
                    status: status.as_u16(),
                });
            }

            if attempt == max_attempts {
                break;
            }

            let delay = self.config.backoff_delay(attempt);
            warn!(
                url,
                status = status.as_u16(),
                error_limit_remain = ?remain,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "retryable response, backing off"
            );
            tokio::time::sleep(delay).await;
        }

        // Budget exhausted: one last unconditional request, surfacing
        // whatever it produces. Callers depend on this extra attempt, so the
        // failure path really makes attempts+1 requests.
        let response = self.request(url, query).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let remain = error_limit_remain(&response);
        if is_retryable(status, remain) {
            Err(FetchError::Transient {
                status: status.as_u16(),
                attempts: max_attempts + 1,
            })
        } else {
            Err(FetchError::Terminal {
                status: status.as_u16(),
            })
        }
    }
}

/// A response is retryable when rate limited, on a transient server failure,
/// or when the server-reported error budget is nearly exhausted.
fn is_retryable(status: StatusCode, error_limit_remain: Option<i64>) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || matches!(status.as_u16(), 502 | 503 | 504)
        || error_limit_remain.is_some_and(|remain| remain <= 1)
}

fn error_limit_remain(response: &Response) -> Option<i64> {
    response
        .headers()
        .get(ERROR_LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}
