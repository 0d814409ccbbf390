use crate::domain::model::Contest;
use crate::domain::ports::FeedSource;
use crate::utils::error::FetchError;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Wire shape of the feed. Chosen explicitly in configuration; the decoder
/// never guesses between shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedFormat {
    /// kenkoooo AtCoder list: flat array, epoch-second start times.
    #[default]
    KenkooooV1,
    /// `{ "contests": [...] }` with RFC 3339 start times.
    EnvelopeV1,
}

impl FeedFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedFormat::KenkooooV1 => "kenkoooo-v1",
            FeedFormat::EnvelopeV1 => "envelope-v1",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kenkoooo-v1" => Ok(FeedFormat::KenkooooV1),
            "envelope-v1" => Ok(FeedFormat::EnvelopeV1),
            other => Err(format!(
                "unknown feed format '{}' (expected kenkoooo-v1 or envelope-v1)",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KenkooooContest {
    id: String,
    start_epoch_second: i64,
    duration_second: i64,
    title: String,
    #[serde(default)]
    rate_change: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    contests: Vec<EnvelopeContest>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeContest {
    id: String,
    title: String,
    start_time: DateTime<Utc>,
    duration: i64,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    rate_change: Option<String>,
}

const ATCODER_CONTEST_URL: &str = "https://atcoder.jp/contests/";

/// Decodes a feed body into validated contests.
pub fn decode_feed(body: &[u8], format: FeedFormat) -> Result<Vec<Contest>, FetchError> {
    match format {
        FeedFormat::KenkooooV1 => {
            let raw: Vec<KenkooooContest> = serde_json::from_slice(body)
                .map_err(|e| FetchError::decode(format!("{} body: {}", format, e)))?;
            raw.into_iter()
                .map(|c| {
                    let start_time = DateTime::from_timestamp(c.start_epoch_second, 0)
                        .ok_or_else(|| {
                            FetchError::decode(format!(
                                "contest '{}' has out-of-range start_epoch_second {}",
                                c.id, c.start_epoch_second
                            ))
                        })?;
                    let url = Some(format!("{}{}", ATCODER_CONTEST_URL, c.id));
                    build_contest(c.id, c.title, start_time, c.duration_second, url, c.rate_change)
                })
                .collect()
        }
        FeedFormat::EnvelopeV1 => {
            let raw: Envelope = serde_json::from_slice(body)
                .map_err(|e| FetchError::decode(format!("{} body: {}", format, e)))?;
            raw.contests
                .into_iter()
                .map(|c| build_contest(c.id, c.title, c.start_time, c.duration, c.url, c.rate_change))
                .collect()
        }
    }
}

fn build_contest(
    id: String,
    title: String,
    start_time: DateTime<Utc>,
    duration: i64,
    url: Option<String>,
    rate_change: Option<String>,
) -> Result<Contest, FetchError> {
    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(FetchError::decode("contest with empty id"));
    }
    let duration_seconds = u64::try_from(duration)
        .map_err(|_| FetchError::decode(format!("contest '{}' has negative duration {}", id, duration)))?;
    if duration > chrono::Duration::MAX.num_seconds() {
        return Err(FetchError::decode(format!(
            "contest '{}' has out-of-range duration {}",
            id, duration
        )));
    }
    Ok(Contest {
        id,
        title,
        start_time,
        duration_seconds,
        url,
        rate_change: rate_change.filter(|r| !r.trim().is_empty()),
    })
}

/// HTTP client for the contest feed. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
    format: FeedFormat,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, format: FeedFormat, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("contest-notifier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self {
            client,
            url: url.into(),
            format,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> FeedFormat {
        self.format
    }
}

#[async_trait::async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<Vec<Contest>, FetchError> {
        tracing::debug!("Requesting contest feed: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        tracing::debug!("Feed response status: {}", status);
        if status != StatusCode::OK {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::Network)?;
        let contests = decode_feed(&body, self.format)?;
        tracing::info!(count = contests.len(), format = %self.format, "Fetched contests");
        Ok(contests)
    }
}
