/*!
 * Delimited input reader.
 *
 * Streams data rows from the localization file with their line numbers.
 * Rows of the wrong width are yielded as-is so the importer can report and
 * skip them instead of failing the whole parse. Empty lines, which the CSV
 * parser drops on its own, come out as rows without fields.
 *
 * The first physical line is the header and is discarded unread, whatever
 * it contains.
 */

use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::ImportError;

/// Number of fields in a data row: attr1..attr4, text_de, text_en
pub const FIELD_COUNT: usize = 6;

/// Number of attribute slots in a row
pub const ATTRIBUTE_SLOTS: usize = 4;

/// Physical line holding the header
pub const HEADER_LINE: u64 = 1;

/// One raw data row
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based line number; the header is line 1
    pub line: u64,
    /// Untrimmed fields
    pub fields: Vec<String>,
    /// Row text as it appears in the file, without the line terminator
    raw: String,
}

/// A data row that has the right shape, with every field trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizationRow {
    pub line: u64,
    /// Attribute names, `None` for empty cells
    pub attribute_names: [Option<String>; ATTRIBUTE_SLOTS],
    pub text_de: String,
    pub text_en: String,
}

impl SourceRow {
    pub fn new(line: u64, fields: Vec<String>, raw: impl Into<String>) -> Self {
        Self {
            line,
            fields,
            raw: raw.into(),
        }
    }

    /// An empty line
    pub fn blank(line: u64) -> Self {
        Self::new(line, Vec::new(), String::new())
    }

    /// Row content as it appeared in the file, for diagnostics
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Validate the shape and trim every field
    pub fn parse(&self) -> Result<LocalizationRow, ImportError> {
        if self.fields.len() != FIELD_COUNT {
            return Err(ImportError::RowShape {
                line: self.line,
                expected: FIELD_COUNT,
                found: self.fields.len(),
                raw: self.raw.clone(),
            });
        }

        let attribute_names = std::array::from_fn(|slot| {
            let name = self.fields[slot].trim();
            (!name.is_empty()).then(|| name.to_string())
        });

        Ok(LocalizationRow {
            line: self.line,
            attribute_names,
            text_de: self.fields[4].trim().to_string(),
            text_en: self.fields[5].trim().to_string(),
        })
    }
}

/// Keeps the bytes the CSV parser has pulled in but the source has not
/// yet turned into rows.
struct ByteWindow<R> {
    inner: R,
    bytes: Vec<u8>,
    /// Absolute offset of `bytes[0]`
    start: u64,
}

impl<R: Read> ByteWindow<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            bytes: Vec::new(),
            start: 0,
        }
    }

    fn span(&self, from: u64, to: u64) -> &[u8] {
        &self.bytes[(from - self.start) as usize..(to - self.start) as usize]
    }

    fn end(&self) -> u64 {
        self.start + self.bytes.len() as u64
    }

    fn discard_before(&mut self, offset: u64) {
        self.bytes.drain(..(offset - self.start) as usize);
        self.start = offset;
    }
}

impl<R: Read> Read for ByteWindow<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Length of the empty line at the start of `bytes`, if there is one
fn blank_line_len(bytes: &[u8]) -> Option<usize> {
    match bytes {
        [b'\r', b'\n', ..] => Some(2),
        [b'\r', ..] | [b'\n', ..] => Some(1),
        _ => None,
    }
}

/// Count CRLF, LF and lone CR line breaks
fn count_line_breaks(bytes: &[u8]) -> u64 {
    let mut count = 0;
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        match b {
            b'\r' => {
                count += 1;
                iter.next_if_eq(&&b'\n');
            }
            b'\n' => count += 1,
            _ => {}
        }
    }
    count
}

/// Drop one trailing line terminator
fn strip_terminator(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .or_else(|| bytes.strip_suffix(b"\r"))
        .unwrap_or(bytes)
}

/// Streaming reader over the input file
pub struct CsvSource<R: Read> {
    reader: Reader<ByteWindow<R>>,
    record: StringRecord,
    pending: VecDeque<SourceRow>,
    /// Byte offset up to which input has been turned into rows
    consumed: u64,
    /// Physical line at `consumed`
    line: u64,
    /// The last row ended with CR; a leading LF belongs to it
    after_cr: bool,
    done: bool,
}

impl CsvSource<File> {
    /// Open a file; the header line is consumed and discarded
    pub fn open<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self, ImportError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(file, delimiter))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(ByteWindow::new(reader));

        Self {
            reader,
            record: StringRecord::new(),
            pending: VecDeque::new(),
            consumed: 0,
            line: 1,
            after_cr: false,
            done: false,
        }
    }

    /// Read the next data row, `None` at end of input
    pub fn next_row(&mut self) -> Result<Option<SourceRow>, ImportError> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                if row.line == HEADER_LINE {
                    continue;
                }
                return Ok(Some(row));
            }
            if self.done {
                return Ok(None);
            }
            self.fill()?;
        }
    }

    // Parse one record and queue it behind the empty lines that precede it
    fn fill(&mut self) -> Result<(), ImportError> {
        let has_record = self.reader.read_record(&mut self.record)?;
        let end = if has_record {
            self.reader.position().byte()
        } else {
            self.reader.get_ref().end()
        };

        let span = self.reader.get_ref().span(self.consumed, end).to_vec();
        let mut rest = span.as_slice();
        if self.after_cr && rest.first() == Some(&b'\n') {
            rest = &rest[1..];
        }
        self.after_cr = false;

        while let Some(len) = blank_line_len(rest) {
            self.pending.push_back(SourceRow::blank(self.line));
            self.line += 1;
            rest = &rest[len..];
        }

        if has_record {
            let fields = self.record.iter().map(str::to_string).collect();
            let raw = String::from_utf8_lossy(strip_terminator(rest));
            self.pending.push_back(SourceRow::new(self.line, fields, raw));
            self.line += count_line_breaks(rest);
            self.after_cr = rest.last() == Some(&b'\r');
        } else {
            self.done = true;
        }

        self.consumed = end;
        self.reader.get_mut().discard_before(end);
        Ok(())
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<SourceRow, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
