//! Incremental log viewer.
//!
//! A reader task pulls byte chunks off the log stream, decodes them and posts
//! one [`AppEvent::LogChunk`] per chunk. The event channel is FIFO, so blocks
//! land in the session in emission order. Events carry the session id; those
//! from an abandoned session are dropped by [`LogSession::append`]'s caller.

use crate::backend::{Backend, ByteStream};
use crate::error::PanelError;
use crate::events::AppEvent;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

pub const STREAM_INTERRUPTED: &str = "── stream interrupted ──";

#[derive(Debug)]
pub struct LogSession {
    pub id: u64,
    pub project: String,
    /// One entry per received chunk, never merged.
    pub blocks: Vec<String>,
    pub line_count: usize,
    pub scroll: usize,
    /// Stick to the end as new blocks arrive.
    pub follow: bool,
    pub finished: bool,
    pub error: Option<String>,
    reader: Option<AbortHandle>,
}

impl LogSession {
    pub fn new(id: u64, project: String) -> Self {
        Self {
            id,
            project,
            blocks: Vec::new(),
            line_count: 0,
            scroll: 0,
            follow: true,
            finished: false,
            error: None,
            reader: None,
        }
    }

    pub fn attach_reader(&mut self, handle: AbortHandle) {
        self.reader = Some(handle);
    }

    pub fn append(&mut self, text: String) {
        self.line_count += block_lines(&text).count();
        self.blocks.push(text);
    }

    pub fn finish(&mut self, error: Option<String>) {
        self.finished = true;
        self.reader = None;
        if error.is_some() {
            self.line_count += 1;
        }
        self.error = error;
    }

    /// Every line to display, block by block, then the interruption marker.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        let marker: Option<&str> = self.error.as_ref().map(|_| STREAM_INTERRUPTED);
        self.blocks
            .iter()
            .flat_map(|b| block_lines(b))
            .chain(marker)
    }

    pub fn text(&self) -> String {
        self.blocks.concat()
    }

    /// Effective top line for a viewport of `visible` lines.
    pub fn top_line(&self, visible: usize) -> usize {
        let max_scroll = self.line_count.saturating_sub(visible);
        if self.follow {
            max_scroll
        } else {
            self.scroll.min(max_scroll)
        }
    }

    pub fn scroll_up(&mut self, amount: usize, visible: usize) {
        self.scroll = self.top_line(visible).saturating_sub(amount);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, amount: usize, visible: usize) {
        let max_scroll = self.line_count.saturating_sub(visible);
        self.scroll = (self.top_line(visible) + amount).min(max_scroll);
        self.follow = self.scroll >= max_scroll;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    /// Stops the reader task, freeing the connection.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
        }
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A chunk always renders as at least one line, like a `<pre>` per chunk.
fn block_lines(block: &str) -> impl Iterator<Item = &str> {
    let body = block.strip_suffix('\n').unwrap_or(block);
    body.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

/// UTF-8 decoder that tolerates multi-byte sequences split across chunks.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        self.pending = rest.to_vec();
        out
    }

    /// Flushes an incomplete trailing sequence at end of stream.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}

/// Drains `stream` into `LogChunk` events until it ends or fails.
pub async fn pump(
    project: &str,
    session: u64,
    mut stream: ByteStream,
    tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let mut decoder = ChunkDecoder::default();
    let mut error = None;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                let text = decoder.decode(&bytes);
                if text.is_empty() {
                    continue;
                }
                if tx.send(AppEvent::LogChunk { session, text }).is_err() {
                    return;
                }
            }
            Err(source) => {
                let err = PanelError::LogStream {
                    project: project.to_string(),
                    source,
                };
                tracing::warn!("{err}");
                error = Some(err.to_string());
                break;
            }
        }
    }
    let tail = decoder.finish();
    if !tail.is_empty() && tx.send(AppEvent::LogChunk { session, text: tail }).is_err() {
        return;
    }
    if tx.send(AppEvent::LogEnded { session, error }).is_err() {
        tracing::debug!("log reader: channel closed");
    }
}

pub fn spawn_reader(
    backend: Arc<dyn Backend>,
    project: String,
    session: u64,
    tx: mpsc::UnboundedSender<AppEvent>,
) -> AbortHandle {
    tokio::spawn(async move {
        match backend.stream_logs(&project).await {
            Ok(stream) => pump(&project, session, stream, &tx).await,
            Err(source) => {
                let err = PanelError::LogStream { project, source };
                tracing::warn!("{err}");
                let _ = tx.send(AppEvent::LogEnded {
                    session,
                    error: Some(err.to_string()),
                });
            }
        }
    })
    .abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use futures_util::stream;
    use pretty_assertions::assert_eq;

    fn session_with(blocks: &[&str]) -> LogSession {
        let mut s = LogSession::new(1, "web".to_string());
        for b in blocks {
            s.append((*b).to_string());
        }
        s
    }

    #[test]
    fn blocks_keep_order() {
        let s = session_with(&["A\n", "B\n"]);
        assert_eq!(s.lines().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(s.text(), "A\nB\n");
    }

    #[test]
    fn chunk_without_newline_is_its_own_block() {
        let s = session_with(&["partial", " rest\n"]);
        assert_eq!(s.lines().collect::<Vec<_>>(), vec!["partial", " rest"]);
        assert_eq!(s.line_count, 2);
    }

    #[test]
    fn multi_line_chunk() {
        let s = session_with(&["one\ntwo\r\nthree\n"]);
        assert_eq!(s.lines().collect::<Vec<_>>(), vec!["one", "two", "three"]);
        assert_eq!(s.line_count, 3);
    }

    #[test]
    fn error_adds_marker_line() {
        let mut s = session_with(&["A\n"]);
        s.finish(Some("reset".into()));
        assert_eq!(s.lines().last(), Some(STREAM_INTERRUPTED));
        assert_eq!(s.line_count, 2);
        assert!(s.finished);
    }

    #[test]
    fn follow_tracks_end() {
        let s = session_with(&["1\n2\n3\n4\n5\n"]);
        assert_eq!(s.top_line(2), 3);
    }

    #[test]
    fn scrolling_up_stops_following() {
        let mut s = session_with(&["1\n2\n3\n4\n5\n"]);
        s.scroll_up(1, 2);
        assert!(!s.follow);
        assert_eq!(s.top_line(2), 2);
        s.append("6\n".to_string());
        assert_eq!(s.top_line(2), 2);
    }

    #[test]
    fn scrolling_back_down_resumes_following() {
        let mut s = session_with(&["1\n2\n3\n4\n5\n"]);
        s.scroll_to_top();
        s.scroll_down(10, 2);
        assert!(s.follow);
    }

    #[test]
    fn decoder_ascii() {
        let mut d = ChunkDecoder::default();
        assert_eq!(d.decode(b"hello"), "hello");
    }

    #[test]
    fn decoder_split_multibyte() {
        let bytes = "été".as_bytes();
        let mut d = ChunkDecoder::default();
        let first = d.decode(&bytes[..1]);
        let second = d.decode(&bytes[1..]);
        assert_eq!(first, "");
        assert_eq!(second, "été");
    }

    #[test]
    fn decoder_invalid_byte_replaced() {
        let mut d = ChunkDecoder::default();
        assert_eq!(d.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn decoder_truncated_tail_flushed() {
        let mut d = ChunkDecoder::default();
        assert_eq!(d.decode(&[b'x', 0xC3]), "x");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert_eq!(d.finish(), "");
    }

    #[tokio::test]
    async fn pump_forwards_chunks_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let chunks: Vec<Result<Vec<u8>, ApiError>> = vec![Ok(b"A".to_vec()), Ok(b"B".to_vec())];
        pump("web", 7, stream::iter(chunks).boxed(), &tx).await;

        let mut texts = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::LogChunk { session, text } => {
                    assert_eq!(session, 7);
                    texts.push(text);
                }
                AppEvent::LogEnded { session, error } => {
                    assert_eq!(session, 7);
                    assert_eq!(error, None);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(texts, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn pump_stops_at_first_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let chunks: Vec<Result<Vec<u8>, ApiError>> = vec![
            Ok(b"A".to_vec()),
            Err(ApiError::Transport("reset".into())),
            Ok(b"never".to_vec()),
        ];
        pump("web", 1, stream::iter(chunks).boxed(), &tx).await;

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], AppEvent::LogChunk { text, .. } if text == "A"));
        assert!(matches!(&events[1], AppEvent::LogEnded { error: Some(_), .. }));
    }
}
