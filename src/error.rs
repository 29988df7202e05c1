//! Error types shared by the catalog, the LLM adapter and the agents.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by collaborators of the routing core.
///
/// None of these reach the caller of `route`: the orchestrator turns them
/// into fallback routes or apology answers.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// HTTP, status or transport failure talking to the language model.
    #[error("LLM error: {0}")]
    Llm(String),

    /// A collaborator did not answer within the configured bound.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// Failure inside the film catalog store.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A reply could not be decoded into the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator is not configured (e.g. missing API key).
    #[error("Not configured: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for ConciergeError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Catalog(e.to_string())
    }
}

impl From<reqwest::Error> for ConciergeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Llm(e.to_string())
    }
}

pub type ConciergeResult<T> = Result<T, ConciergeError>;

/// Run `future` under `limit`, mapping expiry to [`ConciergeError::Timeout`].
pub async fn bounded<T, F>(operation: &'static str, limit: Duration, future: F) -> ConciergeResult<T>
where
    F: std::future::Future<Output = ConciergeResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(ConciergeError::Timeout {
            operation,
            elapsed: limit,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let value = bounded("noop", Duration::from_secs(1), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: ConciergeResult<()> = bounded("sleepy", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(ConciergeError::Timeout { operation, .. }) => assert_eq!(operation, "sleepy"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
