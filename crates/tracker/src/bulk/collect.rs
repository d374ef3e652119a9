//! Identifier collection from inline arguments, a bulk file, and stdin.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::{BulkError, Result};

/// Where to gather identifiers from.
#[derive(Debug, Clone, Default)]
pub struct IdentifierSources {
    /// Identifiers given directly on the command line.
    pub inline: Vec<String>,
    /// File with identifiers separated by newlines, commas, or whitespace.
    pub file: Option<PathBuf>,
    /// Read identifiers from stdin.
    pub stdin: bool,
}

impl IdentifierSources {
    /// True when a file or stdin source was requested.
    pub fn has_stream_source(&self) -> bool {
        self.file.is_some() || self.stdin
    }
}

/// Split text into identifier tokens.
///
/// Runs of whitespace, commas, carriage returns and line feeds all separate
/// tokens, so one-per-line, space- and comma-separated input are equivalent.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Read a bulk file into memory.
pub async fn read_bulk_file(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BulkError::file_not_found(path)),
        Err(e) => Err(BulkError::Io(e)),
    }
}

/// Read an entire stream and decode it as text.
///
/// The timeout only bounds the wait for the first chunk, so redirected but
/// silent input cannot hang the command. Once data arrives the stream is read
/// to EOF however long the producer takes.
pub async fn read_stdin<R>(mut reader: R, timeout: Option<Duration>) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();

    if let Some(limit) = timeout {
        let mut first = [0u8; 4096];
        let read = match tokio::time::timeout(limit, reader.read(&mut first)).await {
            Ok(read) => read?,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = limit.as_millis() as u64,
                    "No data on stdin before the timeout, treating it as empty"
                );
                return Ok(String::new());
            }
        };
        if read == 0 {
            return Ok(String::new());
        }
        buf.extend_from_slice(&first[..read]);
    }

    reader.read_to_end(&mut buf).await?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Gather the deduplicated identifier set from every requested source.
///
/// Sources are read in order inline, file, stdin; the first occurrence of
/// each identifier fixes its position. `stdin` is only read when
/// `sources.stdin` is set.
pub async fn collect_identifiers<R>(
    sources: &IdentifierSources,
    stdin: R,
    stdin_timeout: Option<Duration>,
) -> Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut tokens: Vec<String> = sources
        .inline
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(path) = &sources.file {
        let content = read_bulk_file(path).await?;
        let before = tokens.len();
        tokens.extend(tokenize(&content).map(str::to_string));
        tracing::debug!(path = %path.display(), count = tokens.len() - before, "Read bulk file");
    }

    if sources.stdin {
        let content = read_stdin(stdin, stdin_timeout).await?;
        let before = tokens.len();
        tokens.extend(tokenize(&content).map(str::to_string));
        tracing::debug!(count = tokens.len() - before, "Read identifiers from stdin");
    }

    Ok(dedupe(tokens))
}

fn dedupe(tokens: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tokens.len());
    tokens
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_file(contents: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock should be after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("tracker-bulk-test-{nonce}.txt"));
        std::fs::write(&path, contents).expect("temp file should be writable");
        path
    }

    fn as_set(ids: &[String]) -> BTreeSet<&str> {
        ids.iter().map(String::as_str).collect()
    }

    #[test]
    fn tokenize_accepts_mixed_separators() {
        let tokens: Vec<_> = tokenize("A-1\r\nA-2, A-3\tA-4,,\n\n A-5 ").collect();
        assert_eq!(tokens, ["A-1", "A-2", "A-3", "A-4", "A-5"]);
    }

    #[test]
    fn tokenize_empty_input_yields_nothing() {
        assert_eq!(tokenize(" \n,\r\n ").count(), 0);
    }

    #[tokio::test]
    async fn collects_exact_set_from_bulk_file() {
        let path = temp_file("X-1\nX-2, X-3\n\nX-1");
        let sources = IdentifierSources {
            file: Some(path.clone()),
            ..IdentifierSources::default()
        };

        let ids = collect_identifiers(&sources, tokio::io::empty(), None)
            .await
            .expect("collection should succeed");

        assert_eq!(ids.len(), 3);
        assert_eq!(as_set(&ids), BTreeSet::from(["X-1", "X-2", "X-3"]));
        std::fs::remove_file(&path).expect("temp file should be removable");
    }

    #[tokio::test]
    async fn missing_file_error_names_the_path() {
        let path = std::env::temp_dir().join("tracker-bulk-test-does-not-exist.txt");
        let sources = IdentifierSources {
            file: Some(path.clone()),
            ..IdentifierSources::default()
        };

        let err = collect_identifiers(&sources, tokio::io::empty(), None)
            .await
            .expect_err("missing file should fail");

        assert!(matches!(err, BulkError::FileNotFound { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[tokio::test]
    async fn other_read_errors_propagate_as_io() {
        // A directory exists but cannot be read as a file.
        let dir = std::env::temp_dir();
        let err = read_bulk_file(&dir).await.expect_err("directory read should fail");
        assert!(matches!(err, BulkError::Io(_)));
    }

    #[tokio::test]
    async fn merges_and_dedupes_all_sources() {
        let path = temp_file("B\nC\nA");
        let sources = IdentifierSources {
            inline: vec!["A".to_string(), " B ".to_string(), String::new()],
            file: Some(path.clone()),
            stdin: true,
        };

        let ids = collect_identifiers(&sources, &b"C, D\nA"[..], None)
            .await
            .expect("collection should succeed");

        assert_eq!(ids, ["A", "B", "C", "D"]);
        std::fs::remove_file(&path).expect("temp file should be removable");
    }

    #[tokio::test]
    async fn stdin_is_ignored_unless_requested() {
        let sources = IdentifierSources {
            inline: vec!["A".to_string()],
            ..IdentifierSources::default()
        };

        let ids = collect_identifiers(&sources, &b"B C"[..], None)
            .await
            .expect("collection should succeed");

        assert_eq!(ids, ["A"]);
    }

    #[tokio::test]
    async fn no_sources_yields_empty_set() {
        let ids = collect_identifiers(&IdentifierSources::default(), tokio::io::empty(), None)
            .await
            .expect("collection should succeed");
        assert!(ids.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stdin_times_out_as_empty() {
        // Keep the writer half alive so the reader never sees EOF.
        let (_writer, reader) = tokio::io::duplex(64);
        let text = read_stdin(reader, Some(Duration::from_secs(5)))
            .await
            .expect("timeout should not be an error");
        assert!(text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stdin_producer_keeps_every_identifier() {
        use tokio::io::AsyncWriteExt;

        let (mut writer, reader) = tokio::io::duplex(64);
        let producer = tokio::spawn(async move {
            writer.write_all(b"ENG-1\n").await.expect("write first chunk");
            // Stay open well past the stdin timeout before finishing.
            tokio::time::sleep(Duration::from_secs(30)).await;
            writer.write_all(b"ENG-2\n").await.expect("write second chunk");
        });

        let sources = IdentifierSources {
            stdin: true,
            ..IdentifierSources::default()
        };
        let ids = collect_identifiers(&sources, reader, Some(Duration::from_secs(5)))
            .await
            .expect("collection should succeed");

        producer.await.expect("producer should finish");
        assert_eq!(ids, ["ENG-1", "ENG-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stdin_with_data_but_no_eof_is_not_dropped_at_the_timeout() {
        use tokio::io::AsyncWriteExt;

        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"ENG-1\nENG-2\n").await.expect("write");

        let read = tokio::spawn(read_stdin(reader, Some(Duration::from_secs(5))));
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!read.is_finished(), "reading should wait for EOF, not give up");

        drop(writer);
        let text = read.await.expect("join").expect("read should succeed");
        assert_eq!(tokenize(&text).collect::<Vec<_>>(), ["ENG-1", "ENG-2"]);
    }

    #[tokio::test]
    async fn closed_stdin_without_data_is_empty() {
        let text = read_stdin(tokio::io::empty(), Some(Duration::from_secs(5)))
            .await
            .expect("read should succeed");
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn stdin_decodes_invalid_utf8_lossily() {
        let text = read_stdin(&b"A-1 \xff A-2"[..], None)
            .await
            .expect("read should succeed");
        let tokens: Vec<_> = tokenize(&text).collect();
        assert_eq!(tokens.first(), Some(&"A-1"));
        assert_eq!(tokens.last(), Some(&"A-2"));
    }
}
