use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One row of the historical ticket dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRow {
    #[serde(default)]
    pub ticket_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    pub resolution: String,
}

impl TicketRow {
    pub fn new(description: impl Into<String>, resolution: impl Into<String>) -> Self {
        Self { ticket_id: None, description: description.into(), category: None, priority: None, resolution: resolution.into() }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.ticket_id = Some(id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// An indexed historical ticket. Immutable once the index is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTicket {
    pub id: i64,
    pub raw_description: String,
    pub normalized_description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub resolution_text: String,
}

/// Read every row from a dataset file, or from every supported file under a
/// directory (in file-name order). Rows keep file order.
pub fn load_rows(path: &Path) -> Result<Vec<TicketRow>, IndexError> {
    let files = dataset_files(path)?;
    let mut rows = Vec::new();
    for file in &files {
        let before = rows.len();
        match extension(file).as_deref() {
            Some("csv") => read_csv(file, &mut rows)?,
            Some("jsonl") => read_jsonl(file, &mut rows)?,
            Some("json") => read_json(file, &mut rows)?,
            _ => return Err(IndexError::UnsupportedFormat(file.clone())),
        }
        tracing::debug!(file = %file.display(), rows = rows.len() - before, "loaded dataset file");
    }
    Ok(rows.into_iter().map(clean_row).collect())
}

fn dataset_files(path: &Path) -> Result<Vec<PathBuf>, IndexError> {
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let err = e.into_io_error().unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                IndexError::io(path, err)
            })?;
            let p = entry.path();
            if p.is_file() && matches!(extension(p).as_deref(), Some("csv" | "jsonl" | "json")) {
                files.push(p.to_path_buf());
            }
        }
        Ok(files)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(IndexError::io(path, std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory")))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase())
}

fn read_csv(file: &Path, rows: &mut Vec<TicketRow>) -> Result<(), IndexError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(file)
        .map_err(|source| IndexError::Csv { path: file.to_path_buf(), source })?;
    for record in reader.deserialize::<TicketRow>() {
        let row = record.map_err(|source| IndexError::Csv { path: file.to_path_buf(), source })?;
        rows.push(row);
    }
    Ok(())
}

fn read_jsonl(file: &Path, rows: &mut Vec<TicketRow>) -> Result<(), IndexError> {
    let f = File::open(file).map_err(|e| IndexError::io(file, e))?;
    let reader = BufReader::new(f);
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| IndexError::io(file, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let row: TicketRow =
            serde_json::from_str(&line).map_err(|source| IndexError::Json { path: file.to_path_buf(), line: n + 1, source })?;
        rows.push(row);
    }
    Ok(())
}

fn read_json(file: &Path, rows: &mut Vec<TicketRow>) -> Result<(), IndexError> {
    let f = File::open(file).map_err(|e| IndexError::io(file, e))?;
    let json_err = |source| IndexError::Json { path: file.to_path_buf(), line: 0, source };
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f)).map_err(json_err)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                rows.push(serde_json::from_value(v).map_err(json_err)?);
            }
        }
        other => rows.push(serde_json::from_value(other).map_err(json_err)?),
    }
    Ok(())
}

fn clean_row(mut row: TicketRow) -> TicketRow {
    row.category = row.category.filter(|c| !c.is_empty());
    row.priority = row.priority.filter(|p| !p.is_empty());
    row
}

/// Collapse rows sharing an exact description; the first occurrence wins and
/// survivors keep their relative order.
pub fn dedup_by_description(rows: Vec<TicketRow>) -> Vec<TicketRow> {
    dedup_by(rows, |r| r.description.as_str())
}

pub(crate) fn dedup_by<T>(items: Vec<T>, description: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen: HashSet<String> = HashSet::new();
    let total = items.len();
    let kept: Vec<T> = items.into_iter().filter(|item| seen.insert(description(item).to_string())).collect();
    if kept.len() < total {
        tracing::info!(dropped = total - kept.len(), "collapsed duplicate descriptions");
    }
    kept
}

/// Pair every row with its id, falling back to the row's 1-based position in
/// the combined input.
pub(crate) fn assign_ids(rows: Vec<TicketRow>) -> Vec<(i64, TicketRow)> {
    rows.into_iter()
        .enumerate()
        .map(|(pos, row)| (row.ticket_id.unwrap_or(pos as i64 + 1), row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let rows = vec![
            TicketRow::new("a", "r1").with_id(1),
            TicketRow::new("b", "r2").with_id(2),
            TicketRow::new("a", "r3").with_id(3),
            TicketRow::new("c", "r4").with_id(4),
        ];
        let ids: Vec<_> = dedup_by_description(rows).iter().map(|r| r.ticket_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(4)]);
    }

    #[test]
    fn dedup_is_exact_match() {
        let rows = vec![TicketRow::new("VPN down", "x"), TicketRow::new("vpn down", "y")];
        assert_eq!(dedup_by_description(rows).len(), 2);
    }

    #[test]
    fn empty_labels_become_none() {
        let row = clean_row(TicketRow::new("d", "r").with_category("").with_priority("High"));
        assert_eq!(row.category, None);
        assert_eq!(row.priority.as_deref(), Some("High"));
    }

    #[test]
    fn whitespace_labels_are_kept_verbatim() {
        let row = clean_row(TicketRow::new("d", "r").with_category("  ").with_priority(" "));
        assert_eq!(row.category.as_deref(), Some("  "));
        assert_eq!(row.priority.as_deref(), Some(" "));
    }

    #[test]
    fn missing_ids_use_position() {
        let rows = vec![TicketRow::new("a", "r").with_id(10), TicketRow::new("b", "r")];
        let ids: Vec<i64> = assign_ids(rows).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![10, 2]);
    }

    #[test]
    fn positional_ids_survive_dedup() {
        let rows = vec![TicketRow::new("a", "r").with_id(5), TicketRow::new("a", "dup"), TicketRow::new("b", "r")];
        let kept = dedup_by(assign_ids(rows), |(_, row)| row.description.as_str());
        let ids: Vec<i64> = kept.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![5, 3]);
    }
}
