use crate::error::{Result, StreamError};
use crate::stream::ReadStream;
use std::io::{BufRead, BufReader, Read};

/// A stream of text lines read from a byte reader.
///
/// Lines are split on `\n`; a trailing `\r` is stripped. A final line without
/// a terminator is still yielded before clean exhaustion. Invalid UTF-8 is a
/// failure carrying the 1-based line number.
///
/// ```
/// use pullflow::{LineSource, consume};
///
/// let mut s = LineSource::new("one\r\ntwo\nthree".as_bytes());
/// assert_eq!(consume(&mut s).unwrap(), vec!["one", "two", "three"]);
/// ```
pub struct LineSource<R> {
    reader: Option<R>,
    buf: Vec<u8>,
    line: u64,
    current: Option<String>,
    err: Option<StreamError>,
}

impl<R: BufRead> LineSource<R> {
    /// Read lines from an already buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            buf: Vec::new(),
            line: 0,
            current: None,
            err: None,
        }
    }

    /// Number of lines yielded so far.
    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: Read> LineSource<BufReader<R>> {
    /// Read lines from an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead> ReadStream for LineSource<R> {
    type Item = String;

    fn advance(&mut self) -> bool {
        self.current = None;
        if self.err.is_some() {
            return false;
        }
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        self.buf.clear();
        match reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.err = Some(StreamError::Eof);
                false
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                self.line += 1;
                match String::from_utf8(std::mem::take(&mut self.buf)) {
                    Ok(text) => {
                        self.current = Some(text);
                        true
                    }
                    Err(source) => {
                        self.err = Some(StreamError::Decode {
                            line: self.line,
                            source,
                        });
                        false
                    }
                }
            }
            Err(e) => {
                self.err = Some(e.into());
                false
            }
        }
    }

    fn current(&self) -> String {
        self.current.clone().unwrap_or_default()
    }

    fn error(&self) -> Option<&StreamError> {
        self.err.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            self.current = None;
            tracing::debug!(lines = self.line, "line source closed");
        }
        Ok(())
    }
}
