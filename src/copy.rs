// 📤 COPY text format - tuples as tab-separated lines
//
// Wire format of `COPY ... FROM STDIN WITH DELIMITER E'\t' NULL AS ''`:
// one line per tuple, `\n` terminated, NULL is the empty field. Text values
// escape the characters that would otherwise end a field or a line.

use crate::db::RowSink;
use crate::entities::{OutputRow, Value};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write;

/// Append one tuple as a COPY line (with trailing newline) to `out`
pub fn format_line(row: &[Value], out: &mut String) {
    for (idx, value) in row.iter().enumerate() {
        if idx > 0 {
            out.push('\t');
        }
        match value {
            Value::Null => {}
            Value::Text(s) => escape_into(s, out),
            Value::Integer(v) => {
                let _ = write!(out, "{}", v);
            }
            Value::Real(v) => {
                let _ = write!(out, "{}", v);
            }
        }
    }
    out.push('\n');
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
}

// ============================================================================
// COPY SINK
// ============================================================================

/// A byte stream feeding a COPY statement
pub trait CopyTarget: Write {
    /// Signal end of data; the statement completes here
    fn end_copy(self) -> Result<()>;
}

/// Streams every tuple of a file as one COPY line
pub struct CopySink<W: CopyTarget> {
    writer: W,
    line: String,
    written: u64,
}

impl<W: CopyTarget> CopySink<W> {
    pub fn new(writer: W) -> Self {
        CopySink {
            writer,
            line: String::with_capacity(256),
            written: 0,
        }
    }
}

impl<W: CopyTarget> RowSink for CopySink<W> {
    fn write_row(&mut self, row: OutputRow) -> Result<()> {
        self.line.clear();
        format_line(&row, &mut self.line);
        self.writer
            .write_all(self.line.as_bytes())
            .context("Failed to stream COPY data")?;
        self.written += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<u64> {
        let CopySink { writer, written, .. } = *self;
        writer.end_copy()?;
        Ok(written)
    }
}

// ============================================================================
// TESTS
// ============================================================================
