use crate::scoring::{self, ScoreError};
use crate::sink::{Sink, SinkError};
use crate::types::questionnaire::{
    Letter, QUESTION_COUNT, SECTORS, SECTOR_PLACEHOLDER, SIZE_BUCKETS,
};
use crate::types::record::{Row, TIMESTAMP_FORMAT};
use crate::types::scoring::Assessment;
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Incomplete(#[from] ScoreError),

    #[error("missing contact fields: {}", .0.join(", "))]
    MissingContactFields(Vec<&'static str>),

    #[error("invalid value for {field}: {value}")]
    InvalidContactField { field: &'static str, value: String },
}

/// Raw form fields as posted by the browser. Names match the persisted columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    pub email: Option<String>,
    pub nombre: Option<String>,
    pub empresa: Option<String>,
    pub tamano_empleados: Option<String>,
    pub sector: Option<String>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub q3: Option<String>,
    pub q4: Option<String>,
    pub q5: Option<String>,
    pub q6: Option<String>,
    pub q7: Option<String>,
}

impl FormInput {
    pub fn with_answers(mut self, letters: &[Letter]) -> Self {
        let slots = [
            &mut self.q1,
            &mut self.q2,
            &mut self.q3,
            &mut self.q4,
            &mut self.q5,
            &mut self.q6,
            &mut self.q7,
        ];
        for (slot, letter) in slots.into_iter().zip(letters) {
            *slot = Some(letter.to_string());
        }
        self
    }

    fn raw_answers(&self) -> [Option<&str>; QUESTION_COUNT] {
        [
            self.q1.as_deref(),
            self.q2.as_deref(),
            self.q3.as_deref(),
            self.q4.as_deref(),
            self.q5.as_deref(),
            self.q6.as_deref(),
            self.q7.as_deref(),
        ]
    }

    /// Parsed answer per question; blank or unrecognised values are `None`.
    pub fn answers(&self) -> [Option<Letter>; QUESTION_COUNT] {
        self.raw_answers().map(|raw| raw.and_then(Letter::parse))
    }

    pub fn answer(&self, question_number: usize) -> Option<Letter> {
        question_number
            .checked_sub(1)
            .and_then(|idx| self.answers().get(idx).copied().flatten())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub email: String,
    pub name: String,
    pub company: String,
    pub employee_size: String,
    pub sector: String,
}

impl Contact {
    /// Normalises contact fields. With `required` every field must be present;
    /// otherwise absent fields become empty strings.
    pub fn from_input(input: &FormInput, required: bool) -> Result<Self, SubmissionError> {
        let sector = clean(input.sector.as_deref())
            .filter(|sector| sector != SECTOR_PLACEHOLDER)
            .unwrap_or_default();
        let contact = Self {
            email: clean(input.email.as_deref()).unwrap_or_default(),
            name: clean(input.nombre.as_deref()).unwrap_or_default(),
            company: clean(input.empresa.as_deref()).unwrap_or_default(),
            employee_size: clean(input.tamano_empleados.as_deref()).unwrap_or_default(),
            sector,
        };

        if !contact.employee_size.is_empty() && !SIZE_BUCKETS.contains(&contact.employee_size.as_str())
        {
            return Err(SubmissionError::InvalidContactField {
                field: "tamano_empleados",
                value: contact.employee_size,
            });
        }
        if !contact.sector.is_empty() && !SECTORS.contains(&contact.sector.as_str()) {
            return Err(SubmissionError::InvalidContactField {
                field: "sector",
                value: contact.sector,
            });
        }

        if required {
            let missing = [
                ("email", &contact.email),
                ("nombre", &contact.name),
                ("empresa", &contact.company),
                ("tamano_empleados", &contact.employee_size),
                ("sector", &contact.sector),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect::<Vec<_>>();
            if !missing.is_empty() {
                return Err(SubmissionError::MissingContactFields(missing));
            }
        }

        Ok(contact)
    }
}

fn clean(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// A validated, scored submission. Built once per form post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub submitted_at: NaiveDateTime,
    pub contact: Contact,
    pub answers: [Letter; QUESTION_COUNT],
    pub assessment: Assessment,
}

impl Submission {
    pub fn from_form(
        input: &FormInput,
        contact_required: bool,
        submitted_at: NaiveDateTime,
    ) -> Result<Self, SubmissionError> {
        let contact = Contact::from_input(input, contact_required)?;
        let slots = input.answers();
        let assessment = scoring::score(&slots)?;
        let answers: [Letter; QUESTION_COUNT] = slots
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|letters: Vec<Letter>| ScoreError::MissingAnswers {
                answered: letters.len(),
                expected: QUESTION_COUNT,
            })?;
        Ok(Self {
            submitted_at,
            contact,
            answers,
            assessment,
        })
    }

    pub fn to_row(&self) -> Row {
        let [q1, q2, q3, q4, q5, q6, q7] = self.answers;
        Row {
            timestamp: self.submitted_at.format(TIMESTAMP_FORMAT).to_string(),
            email: self.contact.email.clone(),
            name: self.contact.name.clone(),
            company: self.contact.company.clone(),
            employee_size: self.contact.employee_size.clone(),
            sector: self.contact.sector.clone(),
            q1,
            q2,
            q3,
            q4,
            q5,
            q6,
            q7,
            tier: self.assessment.tier.level(),
            label: self.assessment.label().to_string(),
        }
    }
}

pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Appends the submission to the sink. Failures are returned, never raised,
/// so callers can still show the computed result.
pub fn record(sink: &dyn Sink, submission: &Submission) -> Result<(), SinkError> {
    let row = submission.to_row();
    match sink.append(&row) {
        Ok(()) => {
            tracing::info!(
                sink = sink.name(),
                tier = row.tier,
                "submission recorded"
            );
            Ok(())
        }
        Err(err) => {
            tracing::warn!(sink = sink.name(), error = %err, "submission not recorded");
            Err(err)
        }
    }
}
