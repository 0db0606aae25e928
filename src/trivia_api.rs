// ============================================
// src/trivia_api.rs
// Open Trivia DB からの問題取得
// ============================================

use std::time::Instant;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::error::FetchError;
use crate::questions::RawQuestion;

/// 問題の取得元 (テストでは差し替える)
pub trait QuestionFeed {
    fn fetch(&self, amount: u32) -> Result<Vec<RawQuestion>, FetchError>;
}

/// API のレスポンス全体
#[derive(Debug, Deserialize)]
struct Envelope {
    response_code: u8,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

pub struct OpenTriviaClient {
    client: Client,
    api_url: String,
}

impl OpenTriviaClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
        }
    }
}

impl QuestionFeed for OpenTriviaClient {
    /// 1回だけの同期 GET。リトライはしない
    fn fetch(&self, amount: u32) -> Result<Vec<RawQuestion>, FetchError> {
        info!(url = %self.api_url, amount, "requesting questions");
        let started = Instant::now();

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("amount", amount)])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }
        let envelope: Envelope = response.json()?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_code = envelope.response_code,
            count = envelope.results.len(),
            "trivia API responded"
        );

        if envelope.response_code != 0 {
            return Err(FetchError::Api(envelope.response_code));
        }
        Ok(envelope.results)
    }
}
