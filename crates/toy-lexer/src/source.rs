use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;
use std::ops::Range;

/// Supplier of input text, one line at a time.
///
/// Each call returns exactly one line including its trailing `\n` while input
/// remains (the last line of a source may lack it). An empty result signals end
/// of input, and every later call must be empty as well.
pub trait LineSource<'a> {
    /// Next line of input, or an empty string once input is exhausted.
    fn read_next_line(&mut self) -> Cow<'a, str>;
}

impl<'a, S: LineSource<'a> + ?Sized> LineSource<'a> for &mut S {
    fn read_next_line(&mut self) -> Cow<'a, str> {
        (**self).read_next_line()
    }
}

impl<'a, S: LineSource<'a> + ?Sized> LineSource<'a> for Box<S> {
    fn read_next_line(&mut self) -> Cow<'a, str> {
        (**self).read_next_line()
    }
}

/// Line source over a borrowed in-memory buffer. Lines are handed out as
/// slices of the buffer, never copied.
#[derive(Debug, Clone)]
pub struct MemorySource<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> MemorySource<'a> {
    /// Scan the whole of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Scan only the byte range `[start, end)` of `text`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or splits a character.
    pub fn with_range(text: &'a str, range: Range<usize>) -> Self {
        Self::new(&text[range])
    }

    /// Whether every line has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.text.len()
    }
}

impl<'a> LineSource<'a> for MemorySource<'a> {
    fn read_next_line(&mut self) -> Cow<'a, str> {
        let rest = &self.text[self.pos..];
        let len = match rest.find('\n') {
            Some(newline) => newline + 1,
            None => rest.len(),
        };
        self.pos += len;
        Cow::Borrowed(&rest[..len])
    }
}

/// Failure to pull a line out of a reader.
#[derive(Debug, thiserror::Error)]
#[error("failed to read input line {line}: {source}")]
pub struct SourceError {
    /// 0-based index of the line that could not be read.
    pub line: usize,
    pub source: std::io::Error,
}

/// Line source over any [`BufRead`], such as a buffered file or locked stdin.
///
/// Read failures end the stream: the failing call returns an empty line and
/// the error is kept for [`ReaderSource::take_error`].
pub struct ReaderSource<R> {
    reader: R,
    lines_read: usize,
    finished: bool,
    error: Option<SourceError>,
}

impl<R> fmt::Debug for ReaderSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSource")
            .field("lines_read", &self.lines_read)
            .field("finished", &self.finished)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> ReaderSource<R> {
    /// Read lines from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lines_read: 0,
            finished: false,
            error: None,
        }
    }

    /// Take the read error that ended the stream, if any.
    pub fn take_error(&mut self) -> Option<SourceError> {
        self.error.take()
    }

    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl<'a, R: BufRead> LineSource<'a> for ReaderSource<R> {
    fn read_next_line(&mut self) -> Cow<'a, str> {
        if self.finished {
            return Cow::Borrowed("");
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.finished = true;
                Cow::Borrowed("")
            }
            Ok(_) => {
                self.lines_read += 1;
                Cow::Owned(line)
            }
            Err(source) => {
                tracing::warn!(
                    target: "toy::source",
                    line = self.lines_read,
                    error = %source,
                    "Read failed, ending input"
                );
                self.finished = true;
                self.error = Some(SourceError {
                    line: self.lines_read,
                    source,
                });
                Cow::Borrowed("")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{self, BufReader, Cursor, Read};

    fn lines<'a>(source: &mut impl LineSource<'a>) -> Vec<Cow<'a, str>> {
        let mut out = Vec::new();
        loop {
            let line = source.read_next_line();
            if line.is_empty() {
                break;
            }
            out.push(line);
        }
        out
    }

    #[test]
    fn test_memory_splits_after_newline() {
        let mut src = MemorySource::new("ab\ncd\n");
        assert_eq!(lines(&mut src), vec!["ab\n", "cd\n"]);
        assert!(src.is_exhausted());
    }

    #[test]
    fn test_memory_last_line_without_newline() {
        let mut src = MemorySource::new("ab\ncd");
        assert_eq!(lines(&mut src), vec!["ab\n", "cd"]);
    }

    #[test]
    fn test_memory_empty_lines_are_not_end() {
        let mut src = MemorySource::new("\n\nx");
        assert_eq!(lines(&mut src), vec!["\n", "\n", "x"]);
    }

    #[test]
    fn test_memory_stays_empty_after_end() {
        let mut src = MemorySource::new("a\n");
        assert_eq!(src.read_next_line(), "a\n");
        assert_eq!(src.read_next_line(), "");
        assert_eq!(src.read_next_line(), "");
    }

    #[test]
    fn test_memory_empty_buffer() {
        let mut src = MemorySource::new("");
        assert!(src.is_exhausted());
        assert_eq!(src.read_next_line(), "");
    }

    #[test]
    fn test_memory_lines_are_borrowed() {
        let mut src = MemorySource::new("abc\n");
        assert!(matches!(src.read_next_line(), Cow::Borrowed("abc\n")));
    }

    #[test]
    fn test_memory_range() {
        let text = "skip\nkeep me\nrest";
        let mut src = MemorySource::with_range(text, 5..13);
        assert_eq!(lines(&mut src), vec!["keep me\n"]);
    }

    #[test]
    fn test_reader_lines() {
        let mut src = ReaderSource::new(Cursor::new("def f\nreturn 1;"));
        assert_eq!(lines(&mut src), vec!["def f\n", "return 1;"]);
        assert_eq!(src.lines_read(), 2);
        assert!(src.take_error().is_none());
        assert_eq!(src.read_next_line(), "");
    }

    #[test]
    fn test_reader_invalid_utf8_ends_stream() {
        let bytes: &[u8] = b"ok\n\xff\xfe\n";
        let mut src = ReaderSource::new(BufReader::new(bytes));
        assert_eq!(lines(&mut src), vec!["ok\n"]);
        let err = src.take_error().unwrap();
        assert_eq!(err.line, 1);
        assert_eq!(err.source.kind(), io::ErrorKind::InvalidData);
        assert_eq!(src.read_next_line(), "");
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_reader_io_error_message() {
        let mut src = ReaderSource::new(BufReader::new(Failing));
        assert_eq!(src.read_next_line(), "");
        let err = src.take_error().unwrap();
        assert_eq!(err.to_string(), "failed to read input line 0: disk on fire");
    }

    #[test]
    fn test_reader_debug_without_debug_reader() {
        let src: ReaderSource<Box<dyn BufRead>> = ReaderSource::new(Box::new(Cursor::new("x\n")));
        let shown = format!("{src:?}");
        assert!(shown.starts_with("ReaderSource { lines_read: 0, finished: false, error: None"));
    }

    #[test]
    fn test_boxed_and_borrowed_sources() {
        let mut inner = MemorySource::new("a\nb\n");
        assert_eq!(lines(&mut &mut inner).len(), 2);

        let mut inner = MemorySource::new("a\nb\n");
        assert_eq!(inner.read_next_line(), "a\n");
        let mut boxed: Box<dyn LineSource<'_>> = Box::new(inner);
        assert_eq!(boxed.read_next_line(), "b\n");
        assert_eq!(boxed.read_next_line(), "");
    }
}
