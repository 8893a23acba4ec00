use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::logging::{LogLevel, SharedLogger};
use crate::translate::openai_types::{ChatCompletion, ChatRequest};
use crate::translate::request::to_backend;
use crate::translate::response::normalize_completion;

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

/// Raw backend bytes on their way to the caller, unchanged.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send>>;

/// Outcome of forwarding one chat request
pub enum ProxyOutcome {
    /// Buffered backend success, already reshaped
    Buffered(ChatCompletion),
    /// Streaming backend success; relay as-is
    Stream(ByteStream),
    /// Backend answered with a non-success status; `body` is its raw text
    Rejected { status: u16, body: String },
}

/// Forward a chat request to the configured backend.
///
/// Exactly one backend call is made. Network and parse failures come back as
/// `Err`; a non-success backend status is an `Ok(ProxyOutcome::Rejected)`.
pub async fn forward(
    req: &ChatRequest,
    config: &ProxyConfig,
    api_key: &str,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<ProxyOutcome> {
    let base_url = config.effective_base_url()?;
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let backend_req = to_backend(req, &config.models, &config.defaults);
    let streaming = backend_req.is_streaming();

    logger.info(
        "proxy",
        format!(
            "POST {} model={} -> {}{}",
            url,
            req.model_label(),
            backend_req.model,
            if streaming { " (streaming)" } else { "" }
        ),
    );

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&backend_req)
        .send()
        .await
        .map_err(|e| ProxyError::backend(format!("Request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.map_err(|e| {
            ProxyError::backend(format!("Failed to read error body: {}", e))
        })?;
        logger.log_with_context(
            LogLevel::Error,
            "proxy",
            format!("Backend API error: {}", body),
            serde_json::json!({ "status": status.as_u16(), "model": backend_req.model }),
        );
        return Ok(ProxyOutcome::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    if streaming {
        let relay = relay_stream(response.bytes_stream(), logger.clone());
        return Ok(ProxyOutcome::Stream(Box::pin(relay)));
    }

    let body = response.bytes().await.map_err(|e| {
        ProxyError::backend(format!("Failed to read response body: {}", e))
    })?;
    logger.debug("proxy", format!("Response status={} body_len={}", status, body.len()));

    let data: serde_json::Value = serde_json::from_slice(&body)?;
    let completion = normalize_completion(&data, req.model(), chrono::Utc::now());

    Ok(ProxyOutcome::Buffered(completion))
}

/// Pass backend chunks through in arrival order without reframing.
///
/// A backend read error is logged and ends the relay with an I/O error, which
/// truncates the caller's body.
pub fn relay_stream<S, E>(
    byte_stream: S,
    logger: SharedLogger,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut chunks = 0usize;
        let mut bytes = 0usize;
        let mut failed = false;

        tokio::pin!(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            match chunk_result {
                Ok(chunk) => {
                    chunks += 1;
                    bytes += chunk.len();
                    yield Ok(chunk);
                }
                Err(e) => {
                    logger.error("stream", format!("Byte stream error after {} chunks: {}", chunks, e));
                    yield Err(std::io::Error::other(e.to_string()));
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            logger.info("stream", format!("Stream completed: chunks={} bytes={}", chunks, bytes));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_relay_preserves_order_and_bytes() {
        let parts: [&'static [u8]; 4] = [
            b"data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"He",
            b"llo\"}}]}\n\n",
            b"data: [DONE]\n\n",
            &[0xff, 0xfe, 0x00],
        ];
        let source = stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<Bytes, std::io::Error>(Bytes::from_static(p))),
        );

        let logger = SharedLogger::in_memory();
        let relayed: Vec<Bytes> = tokio_test::block_on(
            relay_stream(source, logger.clone())
                .map(|r| r.unwrap())
                .collect::<Vec<_>>(),
        );

        assert_eq!(relayed.len(), parts.len());
        assert_eq!(relayed.concat(), parts.concat());
        assert!(logger.recent(1)[0].message.contains("chunks=4"));
    }

    #[test]
    fn test_relay_stops_on_error() {
        let source = stream::iter(vec![
            Ok(Bytes::from_static(b"data: a\n\n")),
            Err("connection reset"),
            Ok(Bytes::from_static(b"data: never\n\n")),
        ]);

        let logger = SharedLogger::in_memory();
        let items: Vec<_> = tokio_test::block_on(relay_stream(source, logger.clone()).collect::<Vec<_>>());

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
        assert_eq!(logger.recent(1)[0].level, LogLevel::Error);
    }
}
