//! Line-by-line reader for newline-delimited resources.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::errors::IngestError;

/// Reads a resource one line at a time, numbering lines from 1.
///
/// A line ends at `\n`, `\r` or `\r\n`; the terminator is stripped. Invalid UTF-8 is replaced
/// rather than rejected so one bad line cannot abort the run.
pub struct LineReader<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
    line_number: usize,
    /// The previous line ended with `\r`, so a leading `\n` belongs to it.
    skip_line_feed: bool,
}

impl LineReader<File> {
    /// Open the file at `path`.
    pub async fn open(path: &Path) -> Result<Self, IngestError> {
        let file = File::open(path).await.map_err(|e| {
            IngestError::SourceError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        Ok(Self::new(file))
    }
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::new(),
            line_number: 0,
            skip_line_feed: false,
        }
    }

    /// Next line with its 1-based number, or `None` at end of input.
    pub async fn next_line(&mut self) -> Result<Option<(usize, String)>, IngestError> {
        self.buffer.clear();
        let mut read_any = false;

        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                break;
            }

            if self.skip_line_feed {
                self.skip_line_feed = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }

            read_any = true;
            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    self.buffer.extend_from_slice(&available[..end]);
                    self.skip_line_feed = available[end] == b'\r';
                    self.reader.consume(end + 1);
                    break;
                }
                None => {
                    let len = available.len();
                    self.buffer.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }

        if !read_any {
            return Ok(None);
        }

        self.line_number += 1;
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        Ok(Some((self.line_number, line)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &[u8]) -> Vec<(usize, String)> {
        let mut reader = LineReader::new(input);
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_numbers_lines_from_one() {
        let lines = collect(b"first\nsecond\nthird").await;

        assert_eq!(
            lines,
            vec![
                (1, "first".to_string()),
                (2, "second".to_string()),
                (3, "third".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_strips_crlf_and_keeps_blank_lines() {
        let lines = collect(b"a\r\n\r\nb\n").await;

        assert_eq!(
            lines,
            vec![
                (1, "a".to_string()),
                (2, String::new()),
                (3, "b".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_lone_carriage_return_ends_line() {
        let lines = collect(b"a\rb\r\nc\r").await;

        assert_eq!(
            lines,
            vec![
                (1, "a".to_string()),
                (2, "b".to_string()),
                (3, "c".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_crlf_split_across_reads() {
        let input: &[u8] = b"first\r\nsecond\n";
        let mut reader = LineReader {
            reader: BufReader::with_capacity(6, input),
            buffer: Vec::new(),
            line_number: 0,
            skip_line_feed: false,
        };

        assert_eq!(
            reader.next_line().await.unwrap(),
            Some((1, "first".to_string()))
        );
        assert_eq!(
            reader.next_line().await.unwrap(),
            Some((2, "second".to_string()))
        );
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let lines = collect(b"ok\n\xff\xfebad\n").await;

        assert_eq!(lines.len(), 2);
        assert!(lines[1].1.ends_with("bad"));
        assert!(lines[1].1.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(collect(b"").await.is_empty());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let result = LineReader::open(Path::new("does/not/exist.json")).await;

        assert!(matches!(result, Err(IngestError::SourceError(_))));
    }
}
