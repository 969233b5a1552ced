//! Line decoding for streamed HTTP bodies.
//!
//! OpenRouter and Gemini stream server-sent events; Ollama streams one JSON
//! object per line. Both are built on the same line splitter, which buffers
//! raw bytes so that multi-byte characters and lines split across chunks
//! are reassembled before decoding.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use sabha_application::GatewayError;
use std::pin::Pin;

/// Decoded payload lines, or the transport error that ended the body
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, GatewayError>> + Send>>;

/// Split a byte stream into lines without trailing `\r\n`.
///
/// A final unterminated line is still yielded. A read error is yielded once
/// and ends the stream.
pub fn lines<S>(byte_stream: S) -> LineStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let stream = futures::stream::unfold(
        (Box::pin(byte_stream), BytesMut::with_capacity(8192), false),
        |(mut stream, mut buffer, done)| async move {
            if done {
                return None;
            }

            loop {
                if let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let mut line = buffer.split_to(newline_pos + 1);
                    line.truncate(line.len() - 1);
                    if line.last() == Some(&b'\r') {
                        line.truncate(line.len() - 1);
                    }
                    let line = String::from_utf8_lossy(&line).into_owned();
                    return Some((Ok(line), (stream, buffer, false)));
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                    Some(Err(e)) => {
                        let err = GatewayError::Connection(format!("stream read failed: {}", e));
                        return Some((Err(err), (stream, buffer, true)));
                    }
                    None => {
                        if buffer.is_empty() {
                            return None;
                        }
                        let rest = String::from_utf8_lossy(&buffer).trim_end().to_string();
                        buffer.clear();
                        return Some((Ok(rest), (stream, buffer, true)));
                    }
                }
            }
        },
    );
    Box::pin(stream)
}

/// `data:` payloads of a server-sent event stream.
///
/// Comments, other fields, empty payloads and the `[DONE]` marker are
/// skipped.
pub fn sse_data<S>(byte_stream: S) -> LineStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    Box::pin(lines(byte_stream).filter_map(|line| {
        futures::future::ready(match line {
            Ok(line) => extract_sse_data(&line).map(Ok),
            Err(e) => Some(Err(e)),
        })
    }))
}

/// Non-empty lines of a newline-delimited JSON body
pub fn ndjson<S>(byte_stream: S) -> LineStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    Box::pin(lines(byte_stream).filter_map(|line| {
        futures::future::ready(match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok(line)),
            Err(e) => Some(Err(e)),
        })
    }))
}

fn extract_sse_data(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    let data = trimmed
        .strip_prefix("data: ")
        .or_else(|| trimmed.strip_prefix("data:"))?
        .trim();

    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data.to_string())
}
