use std::fmt::Write;

use form_spec::export::SUBMITTED_AT_FORMAT;
use form_spec::{FormSpec, RenderedAnswer, Response, Violation};
use serde::Serialize;

/// Outline of a form: title, then one line per question.
pub fn form_outline(form: &FormSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Form: {}", display_title(&form.title));
    if let Some(id) = &form.id {
        let _ = writeln!(out, "Id: {} (version {})", id, form.version);
    }
    for (index, question) in form.questions.iter().enumerate() {
        let mut line = format!(
            "{:>3}. {} [{}]",
            index + 1,
            display_title(&question.label),
            question.kind.label()
        );
        if question.required {
            line.push_str(" *");
        }
        let _ = writeln!(out, "{}", line);
        if question.uses_options() {
            for option in &question.options {
                let _ = writeln!(out, "       - {}", display_title(&option.text));
            }
        }
    }
    out
}

/// One line per violation, or `ok_line` when there are none.
pub fn violation_report(violations: &[Violation], ok_line: &str) -> String {
    if violations.is_empty() {
        return format!("{}\n", ok_line);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{} problem(s):", violations.len());
    for violation in violations {
        let _ = writeln!(out, "  - {}", violation);
    }
    out
}

/// Text block for one rendered response.
pub fn response_block(response: &Response, answers: &[RenderedAnswer]) -> String {
    let mut out = String::new();
    let respondent = response
        .respondent
        .as_ref()
        .map(|actor| actor.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    let _ = writeln!(
        out,
        "Response {} by {} at {}",
        response.id,
        respondent,
        response.submitted_at.format(SUBMITTED_AT_FORMAT)
    );
    for answer in answers {
        if answer.orphaned {
            let _ = writeln!(out, "  {} (removed question): {}", answer.label, answer.value);
        } else {
            let _ = writeln!(out, "  {}: {}", display_title(&answer.label), answer.value);
        }
    }
    out
}

/// JSON shape emitted by `formkit render --format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedResponse<'a> {
    pub id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent: Option<&'a str>,
    pub submitted_at: String,
    pub answers: Vec<RenderedAnswer>,
}

impl<'a> RenderedResponse<'a> {
    pub fn new(response: &'a Response, answers: Vec<RenderedAnswer>) -> Self {
        Self {
            id: response.id.as_str(),
            respondent: response.respondent.as_ref().map(|actor| actor.as_str()),
            submitted_at: response.submitted_at.to_rfc3339(),
            answers,
        }
    }
}

fn display_title(text: &str) -> &str {
    if text.trim().is_empty() {
        "(untitled)"
    } else {
        text
    }
}
