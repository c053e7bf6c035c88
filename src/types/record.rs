use crate::types::questionnaire::Letter;
use serde::{Deserialize, Serialize};

/// Persisted column order. Every backend writes exactly these headers.
pub const COLUMNS: [&str; 15] = [
    "timestamp",
    "email",
    "nombre",
    "empresa",
    "tamano_empleados",
    "sector",
    "q1",
    "q2",
    "q3",
    "q4",
    "q5",
    "q6",
    "q7",
    "nivel",
    "etiqueta",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One stored submission. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub timestamp: String,
    pub email: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "tamano_empleados")]
    pub employee_size: String,
    pub sector: String,
    pub q1: Letter,
    pub q2: Letter,
    pub q3: Letter,
    pub q4: Letter,
    pub q5: Letter,
    pub q6: Letter,
    pub q7: Letter,
    #[serde(rename = "nivel")]
    pub tier: u8,
    #[serde(rename = "etiqueta")]
    pub label: String,
}

impl Row {
    pub fn answers(&self) -> [Letter; 7] {
        [
            self.q1, self.q2, self.q3, self.q4, self.q5, self.q6, self.q7,
        ]
    }

    /// Cell values in column order, as sent to spreadsheet backends.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.timestamp.clone(),
            self.email.clone(),
            self.name.clone(),
            self.company.clone(),
            self.employee_size.clone(),
            self.sector.clone(),
        ];
        cells.extend(self.answers().iter().map(|letter| letter.to_string()));
        cells.push(self.tier.to_string());
        cells.push(self.label.clone());
        cells
    }
}

pub fn header_cells() -> Vec<String> {
    COLUMNS.iter().map(|column| column.to_string()).collect()
}
