use serde::{Deserialize, Serialize};
use std::fmt;

use crate::answers::{AnswerValue, Answers};
use crate::codec::{is_empty_answer, normalize};
use crate::ids::{OptionId, QuestionId};
use crate::spec::{FormSpec, MIN_CHOICE_OPTIONS, QuestionSpec};

/// Machine-readable category of a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    TitleRequired,
    LabelRequired,
    TooFewOptions,
    OptionTextRequired,
    AnswerRequired,
    ShapeMismatch,
    UnknownOption,
}

/// One problem found in a schema or a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_id: Option<OptionId>,
}

impl Violation {
    fn form(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            question_id: None,
            option_id: None,
        }
    }

    fn question(code: ViolationCode, question: &QuestionSpec, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            ..Self::form(code, message)
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Human-readable messages, in order.
pub fn messages(violations: &[Violation]) -> Vec<String> {
    violations
        .iter()
        .map(|violation| violation.message.clone())
        .collect()
}

/// Checks that a schema is ready to save. Every rule is evaluated, so the
/// result lists all problems at once; an empty list means save-ready.
/// Positions in messages are 1-based.
pub fn validate_schema(form: &FormSpec) -> Vec<Violation> {
    let mut violations = Vec::new();

    if is_blank(&form.title) {
        violations.push(Violation::form(
            ViolationCode::TitleRequired,
            "Form title is required",
        ));
    }

    for (index, question) in form.questions.iter().enumerate() {
        let position = index + 1;
        if is_blank(&question.label) {
            violations.push(Violation::question(
                ViolationCode::LabelRequired,
                question,
                format!("Question {} label is required", position),
            ));
        }

        if !question.uses_options() {
            continue;
        }
        if question.options.len() < MIN_CHOICE_OPTIONS {
            violations.push(Violation::question(
                ViolationCode::TooFewOptions,
                question,
                format!(
                    "Question {} requires at least {} options",
                    position, MIN_CHOICE_OPTIONS
                ),
            ));
        }
        for (option_index, option) in question.options.iter().enumerate() {
            if is_blank(&option.text) {
                violations.push(Violation {
                    option_id: Some(option.id.clone()),
                    ..Violation::question(
                        ViolationCode::OptionTextRequired,
                        question,
                        format!(
                            "Question {}, Option {} text is required",
                            position,
                            option_index + 1
                        ),
                    )
                });
            }
        }
    }

    violations
}

/// Checks a submission against the form's current schema. At most one
/// violation per question, in schema order. Keys naming no question are
/// ignored.
pub fn validate_response(form: &FormSpec, answers: &Answers) -> Vec<Violation> {
    form.questions
        .iter()
        .filter_map(|question| check_answer(question, answers))
        .collect()
}

fn check_answer(question: &QuestionSpec, answers: &Answers) -> Option<Violation> {
    let value = answers.get(question.id.as_str());
    if is_empty_answer(question.answer_shape(), value) {
        return question.required.then(|| {
            Violation::question(
                ViolationCode::AnswerRequired,
                question,
                format!("\"{}\" is required", question.label),
            )
        });
    }

    // Non-empty from here on.
    let value = value?;
    let normalized = match normalize(question, value) {
        Ok(normalized) => normalized,
        Err(error) => {
            return Some(Violation::question(
                ViolationCode::ShapeMismatch,
                question,
                format!("\"{}\" has an invalid answer: {}", question.label, error),
            ));
        }
    };

    let unknown = match &normalized {
        AnswerValue::Choice(id) => question.option(id.as_str()).is_none().then_some(id),
        AnswerValue::Choices(ids) => ids.iter().find(|id| question.option(id.as_str()).is_none()),
        _ => None,
    };
    unknown.map(|id| Violation {
        option_id: Some(id.clone()),
        ..Violation::question(
            ViolationCode::UnknownOption,
            question,
            format!("\"{}\" has an unknown option '{}'", question.label, id),
        )
    })
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
