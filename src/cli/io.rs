//! JSON output for CLI commands
//!
//! One JSON object per line on stdout, UTF-8.

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write `value` as a single JSON line to `writer`
pub fn write_json_to<W: Write, T: Serialize>(writer: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `value` as a single JSON line to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    write_json_to(&mut io::stdout().lock(), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReplaySummary;

    #[test]
    fn test_summary_line() {
        let summary = ReplaySummary {
            records: 3,
            students: 1,
            next_id: 3,
        };
        let mut out = Vec::new();
        write_json_to(&mut out, &summary).unwrap();

        let line = String::from_utf8(out).unwrap();
        assert_eq!(line, "{\"records\":3,\"students\":1,\"next_id\":3}\n");
    }
}
