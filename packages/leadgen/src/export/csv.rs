//! CSV export.
//!
//! The header is the union of populated columns across all leads (never
//! `id`): named fields in canonical order, then detail keys sorted. Every
//! cell is quoted and rows end with `\n`.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::ExportResult;
use crate::types::lead::{Lead, LeadField};

/// Default export filename.
pub const DEFAULT_FILENAME: &str = "leads_export.csv";

/// One CSV column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvColumn {
    Field(LeadField),
    Detail(String),
}

impl CsvColumn {
    pub fn header(&self) -> &str {
        match self {
            CsvColumn::Field(f) => f.key(),
            CsvColumn::Detail(key) => key,
        }
    }

    fn value<'a>(&self, lead: &'a Lead) -> &'a str {
        let value = match self {
            CsvColumn::Field(f) => lead.field(*f),
            CsvColumn::Detail(key) => lead.details.get(key).map(String::as_str),
        };
        value.unwrap_or("")
    }
}

/// Columns needed to represent `leads`.
pub fn csv_columns(leads: &[Lead]) -> Vec<CsvColumn> {
    let fields = LeadField::ALL
        .into_iter()
        .filter(|&f| leads.iter().any(|l| l.field(f).is_some()))
        .map(CsvColumn::Field);

    let details: BTreeSet<&str> = leads
        .iter()
        .flat_map(|l| l.details.iter())
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, _)| k.as_str())
        .collect();

    fields
        .chain(details.into_iter().map(|k| CsvColumn::Detail(k.to_string())))
        .collect()
}

/// Write `leads` as CSV. Writes nothing for an empty list.
pub fn write_csv<W: Write>(writer: W, leads: &[Lead]) -> ExportResult<()> {
    if leads.is_empty() {
        return Ok(());
    }

    let columns = csv_columns(leads);
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(columns.iter().map(CsvColumn::header))?;
    for lead in leads {
        csv.write_record(columns.iter().map(|c| c.value(lead)))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `leads` to a file at `path`. No file is created for an empty list.
pub fn export_csv(path: impl AsRef<Path>, leads: &[Lead]) -> ExportResult<()> {
    if leads.is_empty() {
        return Ok(());
    }

    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_csv(file, leads)?;
    info!(path = %path.display(), rows = leads.len(), "Exported leads");
    Ok(())
}
