use crate::sink::{Sink, SinkError};
use crate::types::record::{header_cells, Row};
use std::sync::Mutex;

/// Operations the sheet sink needs from a spreadsheet service.
pub trait SheetsApi: Send + Sync {
    /// Title of the first tab of the spreadsheet.
    fn first_sheet_title(&self, spreadsheet_id: &str) -> Result<String, SinkError>;

    fn read_values(&self, spreadsheet_id: &str, range: &str)
        -> Result<Vec<Vec<String>>, SinkError>;

    /// Appends rows after the last non-empty row, parsing cells as typed input.
    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SinkError>;
}

/// Extracts the spreadsheet id from a `docs.google.com/spreadsheets/d/<id>/...` URL.
pub fn spreadsheet_id_from_url(url: &str) -> Result<String, SinkError> {
    let parsed =
        url::Url::parse(url).map_err(|e| SinkError::InvalidTarget(format!("{url}: {e}")))?;
    let mut segments = parsed
        .path_segments()
        .ok_or_else(|| SinkError::InvalidTarget(url.to_string()))?;
    while let Some(segment) = segments.next() {
        if segment == "d" {
            if let Some(id) = segments.next().filter(|id| !id.is_empty()) {
                return Ok(id.to_string());
            }
        }
    }
    Err(SinkError::InvalidTarget(format!(
        "no spreadsheet id in {url}"
    )))
}

/// A1 range covering the whole tab.
fn tab_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Writes rows to the first tab of one spreadsheet. The tab is resolved and
/// the header checked once per sink; later appends reuse the cached title.
pub struct SheetsSink<A> {
    api: A,
    spreadsheet_id: String,
    tab: Mutex<Option<String>>,
}

impl<A: SheetsApi> SheetsSink<A> {
    pub fn new(api: A, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            api,
            spreadsheet_id: spreadsheet_id.into(),
            tab: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn api(&self) -> &A {
        &self.api
    }

    fn worksheet_range(&self) -> Result<String, SinkError> {
        let mut tab = self
            .tab
            .lock()
            .map_err(|_| SinkError::Backend("worksheet cache lock poisoned".to_string()))?;
        if let Some(range) = tab.as_ref() {
            return Ok(range.clone());
        }

        let title = self.api.first_sheet_title(&self.spreadsheet_id)?;
        let range = tab_range(&title);
        // Neither a failed emptiness check nor a failed header write blocks the append.
        match self.api.read_values(&self.spreadsheet_id, &range) {
            Ok(values) if values.iter().all(|row| row.is_empty()) => {
                match self
                    .api
                    .append_values(&self.spreadsheet_id, &range, &[header_cells()])
                {
                    Ok(()) => {
                        tracing::info!(spreadsheet_id = %self.spreadsheet_id, "header row written")
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "could not write header row; appending anyway")
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "could not inspect worksheet; skipping header check");
            }
        }
        *tab = Some(range.clone());
        Ok(range)
    }
}

impl<A: SheetsApi> Sink for SheetsSink<A> {
    fn name(&self) -> &'static str {
        "sheets"
    }

    fn append(&self, row: &Row) -> Result<(), SinkError> {
        let range = self.worksheet_range()?;
        self.api
            .append_values(&self.spreadsheet_id, &range, &[row.cells()])
    }
}
