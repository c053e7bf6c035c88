use crate::types::questionnaire::QUESTIONS;
use crate::types::record::{Row, COLUMNS};
use crate::types::scoring::Assessment;

pub fn to_markdown(assessment: &Assessment) -> String {
    let mut output = String::new();
    output.push_str(&format!("# Resultado: {}\n\n", assessment.tier));
    output.push_str(&format!("{}\n\n", assessment.recommendation()));
    output.push_str("## Respuestas por letra\n\n");
    output.push_str(&format!(
        "- a: {}\n- b: {}\n- c: {}\n- d: {}\n",
        assessment.tally.a, assessment.tally.b, assessment.tally.c, assessment.tally.d
    ));
    output
}

pub fn questionnaire_markdown() -> String {
    let mut output = String::new();
    output.push_str("# Cuestionario de madurez de IA\n\n");
    for question in &QUESTIONS {
        output.push_str(&format!("{}. {}\n", question.number, question.prompt));
        for (letter, text) in question.choices() {
            output.push_str(&format!("   {letter}) {text}\n"));
        }
        output.push('\n');
    }
    output
}

/// Pipe table of stored rows, header first.
pub fn rows_table(rows: &[Row]) -> String {
    let mut output = String::new();
    output.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
    output.push_str(&format!("|{}\n", "---|".repeat(COLUMNS.len())));
    for row in rows {
        let cells = row
            .cells()
            .iter()
            .map(|cell| cell.replace('|', "\\|"))
            .collect::<Vec<_>>();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::questionnaire::Letter;
    use crate::types::scoring::{Tally, Tier};

    #[test]
    fn markdown_report_contains_sections() {
        let assessment = Assessment {
            tier: Tier::Active,
            tally: Tally {
                a: 2,
                b: 4,
                c: 1,
                d: 0,
            },
        };

        let rendered = to_markdown(&assessment);
        assert!(rendered.contains("# Resultado: Nivel 2 – Activo"));
        assert!(rendered.contains("formalicen PoC"));
        assert!(rendered.contains("- b: 4"));
    }

    #[test]
    fn questionnaire_lists_every_option() {
        let rendered = questionnaire_markdown();
        assert!(rendered.contains("7. ¿IA responsable?"));
        assert_eq!(rendered.matches("   d) ").count(), 7);
    }

    #[test]
    fn rows_table_escapes_pipes() {
        let row = Row {
            timestamp: "2026-05-01T10:00:00".to_string(),
            email: String::new(),
            name: "A|B".to_string(),
            company: String::new(),
            employee_size: String::new(),
            sector: String::new(),
            q1: Letter::A,
            q2: Letter::A,
            q3: Letter::A,
            q4: Letter::A,
            q5: Letter::A,
            q6: Letter::A,
            q7: Letter::A,
            tier: 1,
            label: "Conciencia".to_string(),
        };
        let rendered = rows_table(&[row]);
        assert!(rendered.starts_with("| timestamp | email |"));
        assert!(rendered.contains("A\\|B"));
    }
}
