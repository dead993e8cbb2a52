//! Server-sent event connection.

use futures::{future, stream, StreamExt};
use reqwest::header::{ACCEPT, COOKIE};

use super::{LiveHub, SseDecoder};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Stream `GET {api_url}{live_path}` into `hub` until the backend closes it.
///
/// Returns the number of frames dispatched. The request carries the session
/// cookie but no timeout, as the stream is expected to stay open.
pub async fn connect_sse(hub: &LiveHub, config: &ClientConfig) -> Result<usize> {
    let url = format!("{}{}", config.api_url, config.live_path);
    let client = reqwest::Client::builder()
        .connect_timeout(config.request_timeout)
        .build()?;

    let mut request = client.get(&url).header(ACCEPT, "text/event-stream");
    if let Some(cookie) = &config.session_cookie {
        request = request.header(COOKIE, cookie);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("error").to_string(),
        });
    }

    tracing::info!(url = %url, "Live stream connected");

    let mut decoder = SseDecoder::new();
    let mut failure: Option<reqwest::Error> = None;

    // Frames stop at the first broken chunk; the error is returned below
    let frames = response
        .bytes_stream()
        .scan(&mut failure, |failure, chunk| {
            let frames = match chunk {
                Ok(bytes) => Some(stream::iter(decoder.feed(&bytes))),
                Err(e) => {
                    **failure = Some(e);
                    None
                }
            };
            future::ready(frames)
        })
        .flatten()
        .boxed();
    let dispatched = hub.pump(frames).await;

    if let Some(e) = failure {
        tracing::warn!(url = %url, frames = dispatched, error = %e, "Live stream broken");
        return Err(e.into());
    }

    tracing::info!(url = %url, frames = dispatched, "Live stream closed");
    Ok(dispatched)
}
