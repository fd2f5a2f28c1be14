//! File-backed sources and sinks.
//!
//! Paths ending in a registered compression extension (`.gz`, `.zst`) are
//! decompressed/compressed transparently; readers also sniff magic bytes.
//! These helpers sit at the application edge, so they report setup failures
//! as `anyhow` errors with the path in context.

use crate::io::compression::{
    CompressedWriter, FinishWrite, auto_detect_reader, auto_detect_writer,
};
use crate::sink::WriterSink;
use crate::source::LineSource;
use crate::stream::Transform;
use anyhow::{Context, Result};
use std::fs::{File, create_dir_all};
use std::io::{BufReader, Read};
use std::path::Path;

/// Buffered reader over a (possibly compressed) file.
pub type FileReader = BufReader<Box<dyn Read>>;

/// Stream the lines of a file.
///
/// # Errors
/// Returns an error if the file cannot be opened or its codec fails to
/// initialize. Read failures later surface through the stream's `error()`.
pub fn open_lines(path: impl AsRef<Path>) -> Result<LineSource<FileReader>> {
    Ok(LineSource::new(open_reader(path)?))
}

/// Stream typed records from a JSON Lines file.
///
/// # Errors
/// See [`open_lines`].
#[cfg(feature = "io-jsonl")]
pub fn open_json_lines<T>(
    path: impl AsRef<Path>,
) -> Result<crate::io::json::JsonLinesSource<FileReader, T>> {
    Ok(crate::io::json::JsonLinesSource::new(open_reader(path)?))
}

/// Stream typed records from a CSV file.
///
/// # Errors
/// See [`open_lines`].
#[cfg(feature = "io-csv")]
pub fn open_csv<T: serde::de::DeserializeOwned>(
    path: impl AsRef<Path>,
    options: &crate::io::csv::CsvOptions,
) -> Result<crate::io::csv::CsvSource<FileReader, T>> {
    Ok(crate::io::csv::CsvSource::new(open_reader(path)?, options))
}

/// A byte sink writing to a (possibly compressed) file.
///
/// Parent directories are created as needed; an existing file is truncated.
/// Compressed output is only complete once the sink has been closed.
///
/// # Errors
/// Returns an error if the directories or the file cannot be created.
pub fn create_sink(path: impl AsRef<Path>) -> Result<WriterSink<CompressedWriter>> {
    let w = create_writer(path.as_ref())?;
    Ok(WriterSink::with_finish(w, |w: CompressedWriter| w.finish()))
}

/// Render `transform` into a file and return the number of records written.
///
/// # Errors
/// Returns an error if the file cannot be created, or the transform fails.
pub fn write_to_path<T: Transform + ?Sized>(
    transform: &mut T,
    path: impl AsRef<Path>,
) -> Result<u64> {
    let path = path.as_ref();
    let mut w = create_writer(path)?;
    let n = transform
        .write_to(&mut w)
        .with_context(|| format!("write {}", path.display()))?;
    w.finish()
        .with_context(|| format!("finish {}", path.display()))?;
    Ok(n)
}

fn open_reader(path: impl AsRef<Path>) -> Result<FileReader> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    Ok(BufReader::new(rdr))
}

fn create_writer(path: &Path) -> Result<CompressedWriter> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))
}
