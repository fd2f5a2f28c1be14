//! Transparent compression for file-backed sources and sinks.
//!
//! A [`CompressionCodec`] is selected by file extension first, falling back
//! to magic-byte sniffing for readers. Built-in codecs are enabled by
//! feature flags:
//! - **Gzip** (`.gz`) via `flate2` (feature: `compression-gzip`)
//! - **Zstd** (`.zst`) via `zstd` (feature: `compression-zstd`)
//!
//! Custom codecs are added to a [`Codecs`] set with [`Codecs::register`].
//!
//! Compressed output ends with a trailer that is only written by
//! [`FinishWrite::finish`]; dropping a writer without finishing it may leave
//! a truncated file behind without reporting an error.

use anyhow::{Context, Result};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

/// A byte writer with an explicit end-of-output step.
pub trait FinishWrite: Write {
    /// Write any trailer, flush, and release the writer.
    ///
    /// # Errors
    /// Returns the failure writing the trailer or flushing the sink.
    fn finish(self: Box<Self>) -> std::io::Result<()>;
}

/// Writer returned by [`Codecs::writer`].
pub type CompressedWriter = Box<dyn FinishWrite>;

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = (*self).into_inner().map_err(|e| e.into_error())?;
        inner.flush()
    }
}

impl FinishWrite for Box<dyn Write> {
    fn finish(mut self: Box<Self>) -> std::io::Result<()> {
        self.flush()
    }
}

/// Pluggable compression codec.
pub trait CompressionCodec {
    /// Human-readable codec name (e.g., "gzip").
    fn name(&self) -> &str;

    /// Lowercase file extensions including the leading dot.
    fn extensions(&self) -> &[&str];

    /// Magic bytes at the start of a compressed stream, if the format has any.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// Wrap a reader with decompression.
    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;

    /// Wrap a writer with compression.
    fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<CompressedWriter>;
}

/// An ordered set of codecs; the first match wins.
pub struct Codecs {
    codecs: Vec<Box<dyn CompressionCodec>>,
}

impl Default for Codecs {
    /// The codecs enabled by feature flags.
    fn default() -> Self {
        let codecs: Vec<Box<dyn CompressionCodec>> = vec![
            #[cfg(feature = "compression-gzip")]
            Box::new(GzipCodec),
            #[cfg(feature = "compression-zstd")]
            Box::new(ZstdCodec),
        ];
        Self { codecs }
    }
}

impl Codecs {
    /// A set with no codecs; every file is read and written as-is.
    #[must_use]
    pub fn none() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Add a codec after the existing ones.
    #[must_use]
    pub fn register(mut self, codec: Box<dyn CompressionCodec>) -> Self {
        self.codecs.push(codec);
        self
    }

    fn by_extension(&self, path: &Path) -> Option<&dyn CompressionCodec> {
        let name = path.to_string_lossy().to_lowercase();
        self.codecs
            .iter()
            .find(|c| c.extensions().iter().any(|ext| name.ends_with(ext)))
            .map(|c| &**c)
    }

    fn magic_len(&self) -> usize {
        self.codecs
            .iter()
            .filter_map(|c| c.magic_bytes().map(<[u8]>::len))
            .max()
            .unwrap_or(0)
    }

    fn by_magic(&self, head: &[u8]) -> Option<&dyn CompressionCodec> {
        if head.is_empty() {
            return None;
        }
        self.codecs
            .iter()
            .find(|c| c.magic_bytes().is_some_and(|m| head.starts_with(m)))
            .map(|c| &**c)
    }

    /// Wrap `reader` with the codec matching `path_hint`'s extension, or
    /// the codec whose magic bytes start the stream, or nothing.
    ///
    /// The sniffed bytes are read in full even if the reader hands them out
    /// one at a time, and are replayed ahead of the rest of the stream.
    ///
    /// # Errors
    /// Returns an error if the stream head cannot be read or the codec fails
    /// to initialize.
    pub fn reader<R: Read + 'static>(
        &self,
        mut reader: R,
        path_hint: impl AsRef<Path>,
    ) -> Result<Box<dyn Read>> {
        if let Some(codec) = self.by_extension(path_hint.as_ref()) {
            return codec
                .wrap_reader(Box::new(reader))
                .with_context(|| format!("wrap reader with {} codec", codec.name()));
        }
        let mut head = Vec::new();
        (&mut reader)
            .take(self.magic_len() as u64)
            .read_to_end(&mut head)
            .context("read stream header")?;
        let codec = self.by_magic(&head);
        let replayed = Cursor::new(head).chain(reader);
        match codec {
            Some(codec) => codec
                .wrap_reader(Box::new(replayed))
                .with_context(|| format!("wrap reader with {} codec", codec.name())),
            None => Ok(Box::new(replayed)),
        }
    }

    /// Wrap `writer` with the codec matching `path_hint`'s extension, or a
    /// plain buffered writer. Call [`FinishWrite::finish`] when done.
    ///
    /// # Errors
    /// Returns an error if the codec fails to initialize.
    pub fn writer<W: Write + 'static>(
        &self,
        writer: W,
        path_hint: impl AsRef<Path>,
    ) -> Result<CompressedWriter> {
        if let Some(codec) = self.by_extension(path_hint.as_ref()) {
            return codec
                .wrap_writer(Box::new(writer))
                .with_context(|| format!("wrap writer with {} codec", codec.name()));
        }
        Ok(Box::new(BufWriter::new(writer)))
    }
}

/// [`Codecs::reader`] with the default codec set.
///
/// # Errors
/// Returns an error if the codec fails to initialize.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    Codecs::default().reader(reader, path_hint)
}

/// [`Codecs::writer`] with the default codec set.
///
/// # Errors
/// Returns an error if the codec fails to initialize.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<CompressedWriter> {
    Codecs::default().writer(writer, path_hint)
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<CompressedWriter> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-gzip")]
impl<W: Write> FinishWrite for flate2::write::GzEncoder<W> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = flate2::write::GzEncoder::finish(*self)?;
        inner.flush()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }

    fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<CompressedWriter> {
        let encoder = zstd::stream::write::Encoder::new(writer, 3)?;
        Ok(Box::new(ZstdWriter {
            encoder,
            finished: false,
        }))
    }
}

/// Zstd encoder that writes its frame epilogue on `finish`, or on drop as a
/// last resort.
#[cfg(feature = "compression-zstd")]
struct ZstdWriter {
    encoder: zstd::stream::write::Encoder<'static, Box<dyn Write>>,
    finished: bool,
}

#[cfg(feature = "compression-zstd")]
impl Write for ZstdWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.encoder.flush()
    }
}

#[cfg(feature = "compression-zstd")]
impl FinishWrite for ZstdWriter {
    fn finish(mut self: Box<Self>) -> std::io::Result<()> {
        self.finished = true;
        self.encoder.do_finish()?;
        self.encoder.get_mut().flush()
    }
}

#[cfg(feature = "compression-zstd")]
impl Drop for ZstdWriter {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.encoder.do_finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reverse;

    impl CompressionCodec for Reverse {
        fn name(&self) -> &str {
            "reverse"
        }
        fn extensions(&self) -> &[&str] {
            &[".rev"]
        }
        fn magic_bytes(&self) -> Option<&[u8]> {
            None
        }
        fn wrap_reader(&self, mut reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            buf.reverse();
            Ok(Box::new(std::io::Cursor::new(buf)))
        }
        fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<CompressedWriter> {
            Ok(Box::new(writer))
        }
    }

    /// Strips a four-byte tag and upper-cases the rest.
    struct Tagged;

    impl CompressionCodec for Tagged {
        fn name(&self) -> &str {
            "tagged"
        }
        fn extensions(&self) -> &[&str] {
            &[".tag"]
        }
        fn magic_bytes(&self) -> Option<&[u8]> {
            Some(b"TAG!")
        }
        fn wrap_reader(&self, mut reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            let body = buf.get(4..).unwrap_or_default().to_ascii_uppercase();
            Ok(Box::new(Cursor::new(body)))
        }
        fn wrap_writer(&self, writer: Box<dyn Write>) -> std::io::Result<CompressedWriter> {
            Ok(Box::new(writer))
        }
    }

    /// Hands out one byte per `read` call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let end = buf.len().min(1);
            self.0.read(&mut buf[..end])
        }
    }

    #[test]
    fn magic_survives_short_reads() -> Result<()> {
        let codecs = Codecs::none().register(Box::new(Tagged));
        let input = Trickle(Cursor::new(b"TAG!abc".to_vec()));
        let mut out = String::new();
        codecs.reader(input, "no-extension")?.read_to_string(&mut out)?;
        assert_eq!(out, "ABC");
        Ok(())
    }

    #[test]
    fn unmatched_head_is_replayed() -> Result<()> {
        let codecs = Codecs::none().register(Box::new(Tagged));
        let input = Trickle(Cursor::new(b"TAxplain".to_vec()));
        let mut out = String::new();
        codecs.reader(input, "data")?.read_to_string(&mut out)?;
        assert_eq!(out, "TAxplain");
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_finish_reports_trailer_failure() -> Result<()> {
        use crate::testing::FailingWriter;
        // Room for the gzip header only.
        let mut w = Codecs::default().writer(FailingWriter::new(12), "out.gz")?;
        w.write_all(b"hello")?;
        assert!(w.finish().is_err());
        Ok(())
    }

    #[test]
    fn plain_input_passes_through() -> Result<()> {
        let mut r = Codecs::none().reader(&b"plain"[..], "data.txt")?;
        let mut out = String::new();
        r.read_to_string(&mut out)?;
        assert_eq!(out, "plain");
        Ok(())
    }

    #[test]
    fn registered_codec_matches_extension() -> Result<()> {
        let codecs = Codecs::none().register(Box::new(Reverse));
        let mut r = codecs.reader(&b"cba"[..], "DATA.REV")?;
        let mut out = String::new();
        r.read_to_string(&mut out)?;
        assert_eq!(out, "abc");
        Ok(())
    }
}
