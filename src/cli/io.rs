//! JSON output for CLI runs
//!
//! Each run prints exactly one JSON object on stdout.

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write a run summary as one JSON line
pub fn write_summary<T: Serialize>(summary: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_summary_to(&mut stdout, summary)
}

fn write_summary_to<W: Write, T: Serialize>(writer: &mut W, summary: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, summary)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RunOutcome;

    #[test]
    fn test_summary_is_one_line() {
        let mut buffer = Vec::new();
        write_summary_to(
            &mut buffer,
            &RunOutcome::SheetMissing {
                sheet: "October 2026".into(),
            },
        )
        .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["result"], "sheet_missing");
        assert_eq!(parsed["sheet"], "October 2026");
    }
}
