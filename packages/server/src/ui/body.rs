//! Bounded request body draining.
//!
//! Bodies are read chunk by chunk. A chunk that does not arrive within the
//! read timeout is waited for again, up to a fixed number of consecutive
//! timeouts. Any other transport error ends the read.

use std::{fmt::Display, time::Duration};

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, header::CONTENT_LENGTH},
};
use futures_util::{Stream, StreamExt};
use thiserror::Error;

/// Limits applied while draining one body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainLimits {
    /// Bodies longer than this are rejected, never truncated
    pub max_bytes: usize,
    pub read_timeout: Duration,
    /// Consecutive read timeouts tolerated
    pub read_retries: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrainError {
    #[error("Request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Timed out reading request body after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error("Failed to read request body: {0}")]
    Io(String),
}

/// Collect a body stream into memory.
///
/// # Errors
///
/// * `DrainError::TooLarge` - more than `limits.max_bytes` were received
/// * `DrainError::TimedOut` - the read timeout elapsed more than `read_retries` times in a row
/// * `DrainError::Io` - the stream yielded an error
pub async fn drain_body<S, E>(mut stream: S, limits: &DrainLimits) -> Result<Vec<u8>, DrainError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut buffer = Vec::new();
    let mut timeouts = 0;

    loop {
        let chunk = match tokio::time::timeout(limits.read_timeout, stream.next()).await {
            Err(_) => {
                timeouts += 1;
                if timeouts > limits.read_retries {
                    return Err(DrainError::TimedOut { attempts: timeouts });
                }
                tracing::debug!(
                    "Body read timed out, retrying ({}/{})",
                    timeouts,
                    limits.read_retries
                );
                continue;
            }
            Ok(None) => return Ok(buffer),
            Ok(Some(Err(e))) => return Err(DrainError::Io(e.to_string())),
            Ok(Some(Ok(chunk))) => chunk,
        };

        timeouts = 0;
        if buffer.len() + chunk.len() > limits.max_bytes {
            return Err(DrainError::TooLarge {
                limit: limits.max_bytes,
            });
        }
        buffer.extend_from_slice(&chunk);
    }
}

/// Read a request body, refusing early when `Content-Length` is over the limit.
pub async fn read_request_body(
    headers: &HeaderMap,
    body: Body,
    limits: &DrainLimits,
) -> Result<Vec<u8>, DrainError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limits.max_bytes) {
        return Err(DrainError::TooLarge {
            limit: limits.max_bytes,
        });
    }
    drain_body(body.into_data_stream(), limits).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn limits(max_bytes: usize, read_retries: u32) -> DrainLimits {
        DrainLimits {
            max_bytes,
            read_timeout: Duration::from_millis(20),
            read_retries,
        }
    }

    fn chunks(
        parts: &[&'static str],
    ) -> impl Stream<Item = Result<Bytes, String>> + Unpin + use<> {
        stream::iter(
            parts
                .iter()
                .map(|part| Ok(Bytes::from_static(part.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    /// Stream yielding `part` once after `delay`
    fn delayed(
        part: &'static str,
        delay: Duration,
    ) -> impl Stream<Item = Result<Bytes, String>> + Unpin {
        Box::pin(stream::unfold(true, move |pending| async move {
            if !pending {
                return None;
            }
            tokio::time::sleep(delay).await;
            Some((Ok(Bytes::from_static(part.as_bytes())), false))
        }))
    }

    #[tokio::test]
    async fn test_drain_body_collects_chunks() {
        // テスト項目: 複数のチャンクが連結されて返される
        // given (前提条件):
        let body = chunks(&["{\"spot\"", ":true}"]);

        // when (操作):
        let result = drain_body(body, &limits(128, 0)).await;

        // then (期待する結果):
        assert_eq!(result.unwrap(), b"{\"spot\":true}");
    }

    #[tokio::test]
    async fn test_drain_body_at_limit_is_accepted() {
        // テスト項目: 上限ちょうどの本文は受け付けられる
        // given (前提条件):
        let body = chunks(&["abcd", "efgh"]);

        // when (操作):
        let result = drain_body(body, &limits(8, 0)).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_drain_body_too_large() {
        // テスト項目: 上限を超える本文は切り詰めずに拒否される
        // given (前提条件):
        let body = chunks(&["abcd", "efgh", "i"]);

        // when (操作):
        let result = drain_body(body, &limits(8, 0)).await;

        // then (期待する結果):
        assert_eq!(result, Err(DrainError::TooLarge { limit: 8 }));
    }

    #[tokio::test]
    async fn test_drain_body_retries_read_timeout() {
        // テスト項目: 読み込みタイムアウトは再試行され、遅れて届いた本文を受け取れる
        // given (前提条件): 1 回のタイムアウトは 20ms、本文は 50ms 後に届く
        let body = delayed("{\"nav\":true}", Duration::from_millis(50));

        // when (操作):
        let result = drain_body(body, &limits(128, 5)).await;

        // then (期待する結果):
        assert_eq!(result.unwrap(), b"{\"nav\":true}");
    }

    #[tokio::test]
    async fn test_drain_body_retries_exhausted() {
        // テスト項目: 再試行回数を使い切ると TimedOut になる
        // given (前提条件):
        let body = stream::pending::<Result<Bytes, String>>();

        // when (操作):
        let result = drain_body(body, &limits(128, 2)).await;

        // then (期待する結果):
        assert_eq!(result, Err(DrainError::TimedOut { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_drain_body_io_error_is_fatal() {
        // テスト項目: タイムアウト以外の読み込みエラーは再試行されない
        // given (前提条件):
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"{\"all\"")),
            Err("connection reset".to_string()),
        ]);

        // when (操作):
        let result = drain_body(body, &limits(128, 3)).await;

        // then (期待する結果):
        assert_eq!(result, Err(DrainError::Io("connection reset".to_string())));
    }
}
