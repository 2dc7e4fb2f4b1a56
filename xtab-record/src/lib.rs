//! Quote-aware record splitting for delimited text.
//!
//! [`RecordSplitter`] turns a byte stream into raw [`Record`]s: complete
//! logical rows whose text is preserved exactly as read (trailing newline
//! included), each tagged with the 1-based line number it starts on. A
//! delimiter or newline inside a quoted field does not terminate the record,
//! and a doubled quote inside a quoted field is an escaped literal quote.
//!
//! [`split_fields`] applies the same state machine to a single record's
//! text to produce unescaped field values, and [`field_at`] extracts one
//! field by zero-based index. Sharing the state machine means full-record
//! parsing and one-shot extraction can never disagree about where a field
//! begins.

use std::io::Read;

use xtab_result::{Error, Result};

/// Delimiter and quote configuration for splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    /// Field delimiter, a single ASCII byte.
    pub delimiter: u8,
    /// Quote character, a single ASCII byte.
    pub quote: u8,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl SplitOptions {
    /// Default quoting with the given delimiter.
    pub fn with_delimiter(delimiter: u8) -> Self {
        SplitOptions {
            delimiter,
            ..SplitOptions::default()
        }
    }
}

/// One raw logical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Raw record text, including the trailing `\n` or `\r\n` when the
    /// input had one.
    pub text: String,
    /// 1-based line number the record starts on, within its file.
    pub line: u64,
}

impl Record {
    /// Record text without its trailing line terminator.
    pub fn trimmed(&self) -> &str {
        trim_terminator(&self.text)
    }
}

fn trim_terminator(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

/// Parser position within a record. A quote is only quoting when it opens a
/// field; quotes inside an unquoted field are literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    /// At the start of a field, before any of its bytes.
    FieldStart,
    /// Inside an unquoted field.
    Unquoted,
    /// Inside a quoted field.
    Quoted,
    /// Just saw a quote inside a quoted field; the next byte decides
    /// whether it was an escape or the field's closing quote.
    QuoteEnd,
}

const READ_CHUNK: usize = 8 * 1024;

/// Streaming splitter over any [`Read`], yielding one [`Record`] per call.
///
/// Owns its reader; dropping the splitter releases the underlying handle,
/// which is how cursors guarantee at most one open file per scan.
pub struct RecordSplitter<R: Read> {
    input: R,
    options: SplitOptions,
    chunk: Vec<u8>,
    pos: usize,
    filled: usize,
    line: u64,
    eof: bool,
}

impl<R: Read> RecordSplitter<R> {
    pub fn new(input: R, options: SplitOptions) -> Self {
        RecordSplitter {
            input,
            options,
            chunk: vec![0; READ_CHUNK],
            pos: 0,
            filled: 0,
            line: 1,
            eof: false,
        }
    }

    /// The next raw record, or `None` at end of stream.
    ///
    /// Blank lines (a bare line terminator) are skipped. Invalid UTF-8 and
    /// a quoted field left open at end of stream are [`Error::Encoding`].
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            match self.read_record()? {
                Some(record) if record.trimmed().is_empty() => continue,
                other => return Ok(other),
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let start_line = self.line;
        let mut bytes: Vec<u8> = Vec::new();
        let mut state = SplitState::FieldStart;
        let delimiter = self.options.delimiter;
        let quote = self.options.quote;

        loop {
            let byte = match self.next_byte()? {
                Some(byte) => byte,
                None => {
                    if state == SplitState::Quoted {
                        return Err(Error::Encoding(format!(
                            "unterminated quoted field in record starting on line {start_line}"
                        )));
                    }
                    if bytes.is_empty() {
                        return Ok(None);
                    }
                    return finish_record(bytes, start_line).map(Some);
                }
            };
            bytes.push(byte);
            if byte == b'\n' {
                self.line += 1;
            }

            match state {
                SplitState::FieldStart => {
                    if byte == quote {
                        state = SplitState::Quoted;
                    } else if byte == b'\n' {
                        return finish_record(bytes, start_line).map(Some);
                    } else if byte != delimiter {
                        state = SplitState::Unquoted;
                    }
                }
                SplitState::Unquoted => {
                    if byte == delimiter {
                        state = SplitState::FieldStart;
                    } else if byte == b'\n' {
                        return finish_record(bytes, start_line).map(Some);
                    }
                }
                SplitState::Quoted => {
                    if byte == quote {
                        state = SplitState::QuoteEnd;
                    }
                }
                SplitState::QuoteEnd => {
                    if byte == quote {
                        state = SplitState::Quoted;
                    } else if byte == delimiter {
                        state = SplitState::FieldStart;
                    } else if byte == b'\n' {
                        return finish_record(bytes, start_line).map(Some);
                    } else {
                        state = SplitState::Unquoted;
                    }
                }
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.filled {
            if self.eof {
                return Ok(None);
            }
            self.filled = self.input.read(&mut self.chunk)?;
            self.pos = 0;
            if self.filled == 0 {
                self.eof = true;
                return Ok(None);
            }
        }
        let byte = self.chunk[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }
}

fn finish_record(bytes: Vec<u8>, line: u64) -> Result<Record> {
    let text = String::from_utf8(bytes).map_err(|_| {
        Error::Encoding(format!("invalid UTF-8 in record starting on line {line}"))
    })?;
    Ok(Record { text, line })
}

/// Split one record's text into unescaped field values.
///
/// The record's trailing line terminator, if any, is ignored. An empty
/// record yields a single empty field, matching how a delimiter-only record
/// yields empty fields on both sides.
pub fn split_fields(record: &str, options: &SplitOptions) -> Vec<String> {
    let delimiter = options.delimiter as char;
    let quote = options.quote as char;
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut state = SplitState::FieldStart;

    for ch in trim_terminator(record).chars() {
        match state {
            SplitState::FieldStart => {
                if ch == quote {
                    state = SplitState::Quoted;
                } else if ch == delimiter {
                    fields.push(std::mem::take(&mut field));
                } else {
                    field.push(ch);
                    state = SplitState::Unquoted;
                }
            }
            SplitState::Unquoted => {
                if ch == delimiter {
                    fields.push(std::mem::take(&mut field));
                    state = SplitState::FieldStart;
                } else {
                    field.push(ch);
                }
            }
            SplitState::Quoted => {
                if ch == quote {
                    state = SplitState::QuoteEnd;
                } else {
                    field.push(ch);
                }
            }
            SplitState::QuoteEnd => {
                if ch == quote {
                    field.push(quote);
                    state = SplitState::Quoted;
                } else if ch == delimiter {
                    fields.push(std::mem::take(&mut field));
                    state = SplitState::FieldStart;
                } else {
                    field.push(ch);
                    state = SplitState::Unquoted;
                }
            }
        }
    }
    fields.push(field);
    fields
}

/// Extract the field at a zero-based index from a single record, or `None`
/// when the index is out of range. No file I/O, no shared state.
pub fn field_at(record: &str, index: usize, options: &SplitOptions) -> Option<String> {
    split_fields(record, options).into_iter().nth(index)
}
