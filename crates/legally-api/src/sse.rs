//! Server-sent-event framing.
//!
//! [`SseDecoder`] turns arbitrary byte chunks into complete frames following
//! the `text/event-stream` rules: lines end in `\n` or `\r\n`, a blank line
//! dispatches the pending frame, `:` starts a comment, multiple `data:` lines
//! join with `\n`. A frame left incomplete when the body ends is discarded.
//!
//! ```text
//! data: {"kind":"status_change","payload":{"status":"running"},"timestamp":"..."}
//!
//! event: close
//! data: {}
//! ```

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::ApiError;

/// Live frame stream handed to the analysis session.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<SseFrame, ApiError>> + Send>>;

/// One dispatched event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event:` name. `None` is the default `message` event.
    pub event: Option<String>,
    pub data: String,
    pub id: Option<String>,
}

impl SseFrame {
    /// A frame with only a `data:` payload.
    #[must_use]
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// A named frame.
    #[must_use]
    pub fn named(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: Some(event.into()),
            data: data.into(),
            id: None,
        }
    }

    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.event.as_deref() == Some(name)
    }
}

/// Incremental `text/event-stream` decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk. Returns every frame completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event,
            data,
            id: self.id.clone(),
        })
    }
}

struct DecodeState<S> {
    inner: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
}

/// Decode a response byte stream into frames.
///
/// Transport errors surface as [`ApiError::Stream`]; the stream ends when the
/// body ends.
pub fn decode_stream<S, E>(byte_stream: S) -> FrameStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = DecodeState {
        inner: Box::pin(byte_stream),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
    };

    let frames = futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(frame) = state.pending.pop_front() {
                return Some((Ok(frame), state));
            }
            match state.inner.next().await {
                Some(Ok(chunk)) => state.pending.extend(state.decoder.push(&chunk)),
                Some(Err(error)) => {
                    return Some((Err(ApiError::Stream(error.to_string())), state));
                }
                None => return None,
            }
        }
    });
    Box::pin(frames)
}
