//! Sheet Structure Gate
//!
//! Checks that a parameter sheet is well-formed CSV: quotes balance, a
//! header row exists, and every data row has the header's column count.
//! Lines starting with `#` are comments and ignored.

use async_trait::async_trait;

use crate::models::ValidationOutcome;
use crate::validator::{DocumentValidator, GateResult};

/// One parsed CSV record and the line it started on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    line: usize,
    fields: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SheetStructureGate;

impl SheetStructureGate {
    pub fn new() -> Self {
        Self
    }

    /// Returns `(rows, columns)` or the list of problems found.
    pub fn check(&self, document: &str) -> Result<(usize, usize), Vec<String>> {
        let records = split_records(document).map_err(|line| {
            vec![format!("Unbalanced quote in record starting on line {}", line)]
        })?;

        let Some((header, rows)) = records.split_first() else {
            return Err(vec!["Sheet has no header row".to_string()]);
        };

        let mut problems = Vec::new();
        for row in rows {
            if row.fields != header.fields {
                problems.push(format!(
                    "Line {}: expected {} columns, found {}",
                    row.line, header.fields, row.fields
                ));
            }
        }

        if problems.is_empty() {
            Ok((rows.len(), header.fields))
        } else {
            Err(problems)
        }
    }
}

/// Split CSV text into records, honoring quoted fields that span lines.
///
/// Returns the starting line of the first record whose quote never closes.
fn split_records(document: &str) -> Result<Vec<Record>, usize> {
    let mut records = Vec::new();
    let mut line = 1;
    let mut chars = document.chars().peekable();

    while chars.peek().is_some() {
        let start_line = line;

        // Blank and comment lines carry no record
        match chars.peek() {
            Some('\n') => {
                chars.next();
                line += 1;
                continue;
            }
            Some('\r') => {
                chars.next();
                continue;
            }
            Some('#') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
                continue;
            }
            _ => {}
        }

        let mut fields = 1;
        let mut in_quotes = false;
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
                '"' => in_quotes = true,
                ',' if !in_quotes => fields += 1,
                '\n' => {
                    line += 1;
                    if !in_quotes {
                        break;
                    }
                }
                _ => {}
            }
        }

        if in_quotes {
            return Err(start_line);
        }
        records.push(Record {
            line: start_line,
            fields,
        });
    }

    Ok(records)
}

#[async_trait]
impl DocumentValidator for SheetStructureGate {
    fn name(&self) -> &str {
        "sheet-structure"
    }

    async fn validate(&self, document: &str) -> GateResult<ValidationOutcome> {
        Ok(match self.check(document) {
            Ok((rows, columns)) => ValidationOutcome::accepted(format!(
                "Sheet structure ok: {} rows, {} columns",
                rows, columns
            )),
            Err(problems) => ValidationOutcome::rejected(problems.join("\n")),
        })
    }
}
