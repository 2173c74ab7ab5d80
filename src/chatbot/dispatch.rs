//! Paced delivery of long responses.
//!
//! Responses longer than the chat limit are split into fixed-size slices and
//! each slice is sent on its own delayed task. The tasks are tracked per
//! channel so a dropped connection can cancel whatever is still queued.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::chatbot::sink::ChatSink;

/// Split `text` into slices of at most `max_chars` characters.
///
/// Splits on raw character count, not word boundaries. Concatenating the
/// result yields `text` again; empty input yields no chunks.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub struct ChunkScheduler {
    sink: Arc<dyn ChatSink>,
    interval: Duration,
    pending: Mutex<HashMap<String, Vec<AbortHandle>>>,
}

impl ChunkScheduler {
    pub fn new(sink: Arc<dyn ChatSink>, interval: Duration) -> Self {
        Self {
            sink,
            interval,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Queue `chunks` for `channel`; chunk `i` goes out after `i * interval`.
    ///
    /// Returns the number of chunks scheduled.
    pub async fn schedule(&self, channel: &str, chunks: Vec<String>) -> usize {
        let mut pending = self.pending.lock().await;
        let handles = pending.entry(channel.to_string()).or_default();
        handles.retain(|h| !h.is_finished());

        let count = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let delay = self.interval * index as u32;
            let sink = self.sink.clone();
            let channel = channel.to_string();

            let task = tokio::spawn(async move {
                sleep(delay).await;
                debug!("Sending message part to #{}: {}", channel, chunk);
                if let Err(e) = sink.say(&channel, &chunk).await {
                    warn!("{e}");
                }
            });
            handles.push(task.abort_handle());
        }

        count
    }

    /// Abort every queued send for `channel`. Returns how many were still pending.
    pub async fn cancel(&self, channel: &str) -> usize {
        let mut pending = self.pending.lock().await;
        pending.remove(channel).map(abort_all).unwrap_or(0)
    }

    /// Abort every queued send on every channel.
    pub async fn cancel_all(&self) -> usize {
        let mut pending = self.pending.lock().await;
        let cancelled: usize = pending.drain().map(|(_, handles)| abort_all(handles)).sum();
        if cancelled > 0 {
            info!("Cancelled {} pending message part(s)", cancelled);
        }
        cancelled
    }

    /// Number of sends still queued for `channel`.
    pub async fn pending(&self, channel: &str) -> usize {
        let pending = self.pending.lock().await;
        pending
            .get(channel)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }
}

fn abort_all(handles: Vec<AbortHandle>) -> usize {
    let mut aborted = 0;
    for handle in handles {
        if !handle.is_finished() {
            handle.abort();
            aborted += 1;
        }
    }
    aborted
}
