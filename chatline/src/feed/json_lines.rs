//! Feed that reads snapshot payloads, one JSON object per line.
//!
//! Each non-blank line is decoded with
//! [`decode_batch`](chatline_proto::document::decode_batch). Documents that
//! cannot be decoded are skipped with a warning; a line that is not a
//! payload at all is reported as a recoverable [`FeedError::Decode`].

use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use chatline_proto::change::ChangeBatch;
use chatline_proto::document::decode_batch;

use super::{ChangeFeed, FeedError};

/// Snapshot feed over any buffered async reader.
pub struct JsonLinesFeed<R> {
    lines: Lines<R>,
    line_no: usize,
    interval: Option<Duration>,
    delivered: usize,
}

impl<R: AsyncBufRead + Unpin> JsonLinesFeed<R> {
    /// Reads payloads from `reader` as fast as they are available.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            interval: None,
            delivered: 0,
        }
    }

    /// Waits `interval` between deliveries, to replay a recorded session.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

impl JsonLinesFeed<BufReader<File>> {
    /// Opens a JSON-lines file.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Io`] if the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path).await?;
        tracing::info!(path = %path.display(), "reading change feed from file");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin + Send> ChangeFeed for JsonLinesFeed<R> {
    async fn next_batch(&mut self) -> Result<Option<ChangeBatch>, FeedError> {
        if let Some(interval) = self.interval
            && self.delivered > 0
        {
            tokio::time::sleep(interval).await;
        }

        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            self.delivered += 1;
            let decoded = decode_batch(&line).map_err(|source| FeedError::Decode {
                line: self.line_no,
                source,
            })?;
            for err in &decoded.rejected {
                tracing::warn!(line = self.line_no, error = %err, "skipping undecodable document");
            }
            return Ok(Some(decoded.batch));
        }
    }
}
