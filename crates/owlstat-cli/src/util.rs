use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

/// Destination of a report: stdout, or a file given with `--output`.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(io::stdout().lock()));
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub fn target(&self) -> String {
        match self {
            Self::Stdout(_) => "stdout".to_owned(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }

    /// Renders a complete report into this output and flushes it.
    pub fn write_report<F>(mut self, render: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        render(&mut self)
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to write report to {}", self.target()))?;
        if let Self::File { path, .. } = &self {
            tracing::info!(path = %path.display(), "wrote report");
        }
        Ok(())
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn write_json<T>(self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        self.write_report(|w| {
            serde_json::to_writer_pretty(&mut *w, value)?;
            writeln!(w)
        })
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File { writer, .. } => writer.flush(),
        }
    }
}
