use crate::intake::{FormInput, SubmissionError};
use crate::types::questionnaire::{QUESTIONS, SECTORS, SECTOR_PLACEHOLDER, SIZE_BUCKETS};
use crate::types::scoring::Assessment;

const TITLE: &str = "Diagnóstico de Madurez IA";
const STYLE: &str = "body{font-family:sans-serif;max-width:720px;margin:2rem auto;padding:0 1rem}\
fieldset{border:0;border-bottom:1px solid #ddd;margin:0 0 1rem;padding:0 0 1rem}\
label{display:block;margin:.25rem 0}\
.error{color:#a00}.success{color:#060}.info{color:#035}";

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn page(body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<h1>¿En qué nivel de madurez de IA está su empresa?</h1>\n\
<p>Evaluación rápida basada en el Modelo de Madurez de IA (Gartner).</p>\n\
{body}\n</body>\n</html>\n"
    )
}

pub fn rejection_message(err: &SubmissionError) -> String {
    match err {
        SubmissionError::Incomplete(_) => "Por favor responde todas las preguntas.".to_string(),
        SubmissionError::MissingContactFields(fields) => {
            format!("Completa los datos de contacto: {}.", fields.join(", "))
        }
        SubmissionError::InvalidContactField { field, .. } => {
            format!("Valor no válido para {field}.")
        }
    }
}

fn text_input(name: &str, label: &str, value: Option<&str>, required: bool) -> String {
    format!(
        "<label>{label}{mark}<br><input type=\"text\" name=\"{name}\" value=\"{value}\"{req}></label>\n",
        mark = if required { " *" } else { "" },
        value = escape(value.unwrap_or_default()),
        req = if required { " required" } else { "" },
    )
}

fn contact_section(input: &FormInput, required: bool) -> String {
    let mut html = String::new();
    let legend = if required {
        "Datos de contacto"
    } else {
        "Datos de contacto (opcional)"
    };
    html.push_str(&format!("<fieldset>\n<legend>{legend}</legend>\n"));
    html.push_str(&text_input("email", "Email", input.email.as_deref(), required));
    html.push_str(&text_input(
        "nombre",
        "Nombres y Apellidos",
        input.nombre.as_deref(),
        required,
    ));
    html.push_str(&text_input(
        "empresa",
        "Empresa",
        input.empresa.as_deref(),
        required,
    ));

    html.push_str(
        "<p>¿Cuál es el tamaño de la empresa por cantidad de empleados aproximadamente?</p>\n",
    );
    for bucket in SIZE_BUCKETS {
        let checked = input.tamano_empleados.as_deref() == Some(bucket);
        html.push_str(&format!(
            "<label><input type=\"radio\" name=\"tamano_empleados\" value=\"{value}\"{checked}> {value}</label>\n",
            value = escape(bucket),
            checked = if checked { " checked" } else { "" },
        ));
    }

    html.push_str("<label>Sector - Industria<br><select name=\"sector\">\n");
    html.push_str(&format!(
        "<option value=\"{0}\">{0}</option>\n",
        escape(SECTOR_PLACEHOLDER)
    ));
    for sector in SECTORS {
        let selected = input.sector.as_deref() == Some(sector);
        html.push_str(&format!(
            "<option value=\"{value}\"{selected}>{value}</option>\n",
            value = escape(sector),
            selected = if selected { " selected" } else { "" },
        ));
    }
    html.push_str("</select></label>\n</fieldset>\n");
    html
}

fn questions_section(input: &FormInput) -> String {
    let mut html = String::from("<h2>Cuestionario (selección única por pregunta)</h2>\n");
    for question in &QUESTIONS {
        let chosen = input.answer(question.number);
        html.push_str(&format!(
            "<fieldset>\n<legend><strong>{}. {}</strong></legend>\n",
            question.number,
            escape(question.prompt)
        ));
        for (letter, text) in question.choices() {
            html.push_str(&format!(
                "<label><input type=\"radio\" name=\"{name}\" value=\"{letter}\"{checked}> {letter}) {text}</label>\n",
                name = question.field_name(),
                checked = if chosen == Some(letter) { " checked" } else { "" },
                text = escape(text),
            ));
        }
        html.push_str("</fieldset>\n");
    }
    html
}

/// The questionnaire, pre-filled from `input` and headed by `error` if any.
pub fn form_page(input: &FormInput, error: Option<&str>, contact_required: bool) -> String {
    let mut body = String::new();
    if let Some(message) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(message)));
    }
    body.push_str("<form method=\"post\" action=\"/\">\n");
    body.push_str(&contact_section(input, contact_required));
    body.push_str(&questions_section(input));
    body.push_str("<button type=\"submit\">📊 Calcular y guardar resultado</button>\n</form>\n");
    body.push_str("<p><small>Basado en el Modelo de Madurez de IA de Gartner.</small></p>");
    page(&body)
}

/// Result view. `saved` carries the storage failure reason, if any.
pub fn result_page(assessment: &Assessment, saved: Result<(), &str>) -> String {
    let mut body = format!(
        "<p class=\"success\"><strong>Resultado: {}</strong></p>\n<p>📌 {}</p>\n",
        escape(&assessment.tier.to_string()),
        escape(assessment.recommendation())
    );
    match saved {
        Ok(()) => body.push_str("<p class=\"info\">✅ Respuesta guardada.</p>\n"),
        Err(reason) => body.push_str(&format!(
            "<p class=\"error\">❌ No se pudo guardar la respuesta: {}. \
Verifica la configuración del almacenamiento.</p>\n",
            escape(reason)
        )),
    }
    body.push_str("<p><a href=\"/\">Volver al cuestionario</a></p>");
    page(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreError;
    use crate::types::scoring::{Tally, Tier};

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn form_page_renders_all_questions_and_preserves_choices() {
        let input = FormInput {
            nombre: Some("<b>Ana</b>".to_string()),
            q3: Some("c".to_string()),
            sector: Some("Salud".to_string()),
            ..FormInput::default()
        };
        let html = form_page(&input, Some("Por favor responde todas las preguntas."), false);

        for question in &QUESTIONS {
            assert!(html.contains(&format!("name=\"{}\"", question.field_name())));
        }
        assert!(html.contains("name=\"q3\" value=\"c\" checked"));
        assert!(!html.contains("name=\"q3\" value=\"a\" checked"));
        assert!(html.contains("value=\"Salud\" selected"));
        assert!(html.contains("&lt;b&gt;Ana&lt;/b&gt;"));
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("Datos de contacto (opcional)"));
    }

    #[test]
    fn required_contact_marks_inputs() {
        let html = form_page(&FormInput::default(), None, true);
        assert!(html.contains("name=\"email\" value=\"\" required"));
        assert!(!html.contains("(opcional)"));
    }

    #[test]
    fn result_page_reports_storage_failure_reason() {
        let assessment = Assessment {
            tier: Tier::Operational,
            tally: Tally {
                a: 0,
                b: 0,
                c: 7,
                d: 0,
            },
        };
        let ok = result_page(&assessment, Ok(()));
        assert!(ok.contains("Resultado: Nivel 3 – Operacional"));
        assert!(ok.contains("Respuesta guardada"));

        let failed = result_page(&assessment, Err("http 403: <denied>"));
        assert!(failed.contains("Resultado: Nivel 3 – Operacional"));
        assert!(failed.contains("No se pudo guardar la respuesta: http 403: &lt;denied&gt;"));
    }

    #[test]
    fn rejection_messages_name_the_problem() {
        let incomplete = SubmissionError::Incomplete(ScoreError::MissingAnswers {
            answered: 3,
            expected: 7,
        });
        assert_eq!(
            rejection_message(&incomplete),
            "Por favor responde todas las preguntas."
        );
        let missing = SubmissionError::MissingContactFields(vec!["email", "sector"]);
        assert_eq!(
            rejection_message(&missing),
            "Completa los datos de contacto: email, sector."
        );
    }
}
