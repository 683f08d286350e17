use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

/// One output line: a file, its counted lines and its top authors with
/// their raw line counts, highest score first.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub file: String,
    pub line_count: usize,
    pub authors: Vec<(String, usize)>,
}

impl ReportRow {
    /// `None` when no lines were counted; such files are not reported.
    pub fn new(file: &Path, line_count: usize, authors: Vec<(String, usize)>) -> Option<Self> {
        if line_count == 0 {
            return None;
        }
        Some(Self {
            file: file.to_string_lossy().into_owned(),
            line_count,
            authors,
        })
    }

    pub fn to_csv(&self) -> String {
        let mut fields: Vec<Cow<'_, str>> = Vec::with_capacity(2 + self.authors.len() * 2);
        fields.push(escape_csv(&self.file));
        fields.push(Cow::Owned(self.line_count.to_string()));
        for (author, lines) in &self.authors {
            fields.push(escape_csv(author));
            fields.push(Cow::Owned(lines.to_string()));
        }
        fields.join(",")
    }
}

/// Header naming `top` committer/line-count column pairs.
pub fn csv_header(top: usize) -> String {
    let mut header = String::from("file,line count");
    for i in 1..=top {
        header.push_str(&format!(",committer {i},line count {i}"));
    }
    header
}

/// Quote a field when it contains a comma, quote or line break.
fn escape_csv(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn write_csv_header<W: Write>(out: &mut W, top: usize) -> io::Result<()> {
    writeln!(out, "{}", csv_header(top))
}

pub fn write_csv_row<W: Write>(out: &mut W, row: &ReportRow) -> io::Result<()> {
    writeln!(out, "{}", row.to_csv())
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    author: &'a str,
    lines: usize,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: &'a str,
    line_count: usize,
    authors: Vec<JsonAuthor<'a>>,
}

pub fn write_json<W: Write>(out: &mut W, rows: &[ReportRow]) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<JsonEntry> = rows
        .iter()
        .map(|r| JsonEntry {
            file: &r.file,
            line_count: r.line_count,
            authors: r
                .authors
                .iter()
                .map(|(author, lines)| JsonAuthor {
                    author,
                    lines: *lines,
                })
                .collect(),
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &entries)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
