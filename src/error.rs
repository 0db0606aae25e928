// ============================================
// src/error.rs
// 問題取得まわりのエラー型
// ============================================

use thiserror::Error;

/// トリビア API との通信エラー
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("trivia API request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Open Trivia DB の `response_code` が 0 以外
    #[error("trivia API answered with response code {0}")]
    Api(u8),
}

/// 出題できる問題が1問も得られなかった理由
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not load questions from the trivia API")]
    Unreachable(#[source] FetchError),
    #[error(
        "no new questions available ({fetched} fetched, all already used); \
         run with --reset-used to repeat questions"
    )]
    Exhausted { fetched: usize },
}
