//! CSV audit report.
//!
//! One header row plus one row per affected release, written to the given
//! stream (stdout in the binary). Fields containing commas, quotes, or
//! newlines are double-quoted with internal quotes doubled; timestamps
//! render as RFC 3339 UTC.

use std::borrow::Cow;
use std::io::{self, Write};

use chrono::SecondsFormat;

use crate::engine::AuditRow;

/// The audit report's header row.
pub const HEADER: &str = "organization_id,release_id,version,date_added,action";

/// Write the header row to `out`.
///
/// # Errors
/// Propagates any I/O error from the underlying stream.
pub fn write_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{HEADER}")
}

/// Write one audit row to `out`.
///
/// Rows are written as each group is applied, so the report stays a
/// faithful (if truncated) record when a later group aborts the run.
///
/// # Errors
/// Propagates any I/O error from the underlying stream.
pub fn write_row<W: Write>(out: &mut W, row: &AuditRow) -> io::Result<()> {
    writeln!(
        out,
        "{},{},{},{},{}",
        row.organization,
        row.release,
        field(row.version.as_str()),
        row.date_added.to_rfc3339_opts(SecondsFormat::Secs, true),
        row.action,
    )
}

/// Write the full audit report to `out`.
///
/// # Errors
/// Propagates any I/O error from the underlying stream.
pub fn write_csv<W: Write>(out: &mut W, rows: &[AuditRow]) -> io::Result<()> {
    write_header(out)?;
    for row in rows {
        write_row(out, row)?;
    }
    out.flush()
}

/// Quote a field if it contains a delimiter, quote, or line break.
fn field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
