use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::engine::outcome::Outcome;
use crate::engine::system::{CommandResult, System};
use crate::store::FileStore;

use super::formatter::{self, OutputMode};

/// Maximum bytes per input line, newline excluded.
pub const MAX_LINE_LENGTH: usize = 4096;

#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Line(String),
    TooLong,
    Eof,
}

/// Read one line, capped at MAX_LINE_LENGTH bytes. The rest of an oversized
/// line is discarded so the next read starts on a fresh line.
async fn read_bounded_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<LineRead> {
    buf.clear();
    let n = (&mut *reader)
        .take(MAX_LINE_LENGTH as u64 + 1)
        .read_until(b'\n', buf)
        .await?;
    if n == 0 {
        return Ok(LineRead::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE_LENGTH {
        discard_line(reader).await?;
        return Ok(LineRead::TooLong);
    }

    Ok(LineRead::Line(String::from_utf8_lossy(buf).into_owned()))
}

async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        if let Some(pos) = available.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = available.len();
        reader.consume(len);
    }
}

/// Interactive front end: reads command lines, runs them against the
/// system, writes feedback and keeps the data files in sync.
pub struct Console {
    system: System,
    store: Option<FileStore>,
    autosave: bool,
    output: OutputMode,
    /// Set when state changed since the last successful save.
    dirty: bool,
}

impl Console {
    pub fn new(system: System, output: OutputMode) -> Self {
        Self {
            system,
            store: None,
            autosave: false,
            output,
            dirty: false,
        }
    }

    pub fn with_store(mut self, store: FileStore, autosave: bool) -> Self {
        self.store = Some(store);
        self.autosave = autosave;
        self
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run until `quit` or end of input. Only write failures are returned;
    /// command and save failures are reported and the loop continues.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("console session started");
        let mut buf = Vec::with_capacity(256);

        loop {
            let line = match read_bounded_line(&mut reader, &mut buf).await? {
                LineRead::Line(line) => line,
                LineRead::TooLong => {
                    warn!(max = MAX_LINE_LENGTH, "input line too long, discarded");
                    let notice = formatter::notice(formatter::LINE_TOO_LONG, self.output);
                    write_lines(&mut writer, &[notice]).await?;
                    continue;
                }
                LineRead::Eof => {
                    debug!("end of input");
                    let lines = formatter::render(&Ok(Outcome::Farewell), self.output);
                    write_lines(&mut writer, &lines).await?;
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let result = self.execute(&line).await;
            write_lines(&mut writer, &formatter::render(&result, self.output)).await?;

            if matches!(result, Ok(Outcome::Farewell)) {
                break;
            }
        }

        if self.dirty {
            self.save().await;
        }
        writer.flush().await?;
        info!("console session ended");
        Ok(())
    }

    /// Execute one line and persist if it changed anything.
    pub async fn execute(&mut self, line: &str) -> CommandResult {
        let result = self.system.execute(line);
        match &result {
            Ok(outcome) if outcome.mutates() => {
                self.dirty = true;
                if self.autosave {
                    self.save().await;
                }
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "command rejected"),
        }
        result
    }

    /// Write the current state to disk. Failures are logged and leave the
    /// dirty flag set so exit retries.
    pub async fn save(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let directory = self.system.directory();
        match store.save_all(directory.users(), directory.servers()).await {
            Ok(()) => self.dirty = false,
            Err(e) => error!(error = %e, "failed to save state"),
        }
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(writer: &mut W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await
}
