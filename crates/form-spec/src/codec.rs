//! Answer normalization and rendering, dispatched on [`AnswerShape`].
//!
//! Normalization runs when a submission is accepted and may reject values.
//! Rendering runs over stored history and never fails: anything it cannot
//! interpret against the current schema is shown as the raw stored value.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::answers::{AnswerValue, Response};
use crate::ids::{FileRef, OptionId, QuestionId};
use crate::registry::AnswerShape;
use crate::spec::{FormSpec, QuestionSpec};
use crate::store::FileStore;

/// Shown for unanswered questions in display output.
pub const EMPTY_PLACEHOLDER: &str = "-";

/// Shown for file answers whose bytes cannot be linked.
pub const UPLOADED_MARKER: &str = "File uploaded";

/// Why a submitted value does not fit its question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("expected a {} answer", .expected.as_str())]
    Mismatch { expected: AnswerShape },
    #[error("'{0}' is not a calendar date (YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("'{0}' is not a time of day (HH:MM)")]
    InvalidTime(String),
}

/// How calendar dates are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    /// `2025-05-21`
    Iso,
    /// `5/21/2025`, unpadded
    #[default]
    Short,
    /// `May 21, 2025`
    Medium,
    /// `September 3, 2025`
    Long,
}

impl DateStyle {
    fn pattern(self) -> &'static str {
        match self {
            DateStyle::Iso => "%Y-%m-%d",
            DateStyle::Short => "%-m/%-d/%Y",
            DateStyle::Medium => "%b %-d, %Y",
            DateStyle::Long => "%B %-d, %Y",
        }
    }

    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

impl FromStr for DateStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "iso" => Ok(DateStyle::Iso),
            "short" => Ok(DateStyle::Short),
            "medium" => Ok(DateStyle::Medium),
            "long" => Ok(DateStyle::Long),
            _ => Err(format!("unknown date style '{}'", value)),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub date_style: DateStyle,
}

/// Display/export form of one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rendered {
    Empty,
    Text(String),
    List(Vec<String>),
    /// File answer with a resolvable URL.
    Download(String),
    /// File answer without a URL.
    Uploaded,
}

impl Rendered {
    /// Cell text for CSV export. Unanswered cells stay blank.
    pub fn to_cell(&self) -> String {
        match self {
            Rendered::Empty => String::new(),
            Rendered::Text(text) => text.clone(),
            Rendered::List(items) => items.join(", "),
            Rendered::Download(url) => url.clone(),
            Rendered::Uploaded => UPLOADED_MARKER.to_string(),
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Empty => f.write_str(EMPTY_PLACEHOLDER),
            Rendered::Download(url) => write!(f, "Download: {}", url),
            other => f.write_str(&other.to_cell()),
        }
    }
}

/// A rendered answer paired with the question it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedAnswer {
    pub question_id: QuestionId,
    /// Question label, or the bare id when the question no longer exists.
    pub label: String,
    pub value: Rendered,
    /// The answer references a question the schema no longer has.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub orphaned: bool,
}

/// Whether `value` counts as unanswered for a question of `shape`.
pub fn is_empty_answer(shape: AnswerShape, value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return true;
    };
    match (shape, value) {
        (_, Value::Null) => true,
        (AnswerShape::SetOfEnumId, Value::Array(items)) => {
            items.iter().all(|item| id_text(item).is_none())
        }
        (_, Value::String(text)) => text.trim().is_empty(),
        (_, Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

/// Canonicalizes a non-empty submitted value for `question`.
pub fn normalize(question: &QuestionSpec, value: &Value) -> Result<AnswerValue, ShapeError> {
    let shape = question.answer_shape();
    let mismatch = move || ShapeError::Mismatch { expected: shape };

    match shape {
        AnswerShape::ScalarText => value
            .as_str()
            .map(|text| AnswerValue::Text(text.to_string()))
            .ok_or_else(mismatch),
        AnswerShape::ScalarEnumId => id_text(value)
            .map(|id| AnswerValue::Choice(OptionId::new(id)))
            .ok_or_else(mismatch),
        AnswerShape::SetOfEnumId => {
            let items = value.as_array().ok_or_else(mismatch)?;
            let mut ids: Vec<OptionId> = Vec::with_capacity(items.len());
            let present = items
                .iter()
                .filter(|item| !is_empty_answer(AnswerShape::ScalarText, Some(*item)));
            for item in present {
                let id = OptionId::new(id_text(item).ok_or_else(mismatch)?);
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Ok(AnswerValue::Choices(ids))
        }
        AnswerShape::Date => {
            let text = value.as_str().ok_or_else(mismatch)?;
            parse_date(text)
                .map(AnswerValue::Date)
                .ok_or_else(|| ShapeError::InvalidDate(text.to_string()))
        }
        AnswerShape::Time => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if parse_time(text).is_some() {
                Ok(AnswerValue::Time(text.to_string()))
            } else {
                Err(ShapeError::InvalidTime(text.to_string()))
            }
        }
        AnswerShape::FileRef => value
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .map(|text| AnswerValue::File(FileRef::new(text)))
            .ok_or_else(mismatch),
    }
}

/// Renders a stored value against the question's current definition.
pub fn render(
    question: &QuestionSpec,
    value: Option<&Value>,
    file_url: Option<&str>,
    options: &RenderOptions,
) -> Rendered {
    let shape = question.answer_shape();
    let empty = is_empty_answer(shape, value);

    match (shape, value) {
        (AnswerShape::FileRef, _) => match file_url {
            Some(url) => Rendered::Download(url.to_string()),
            None if empty => Rendered::Empty,
            None => Rendered::Uploaded,
        },
        (_, None) => Rendered::Empty,
        _ if empty => Rendered::Empty,
        (AnswerShape::ScalarText | AnswerShape::Time, Some(value)) => {
            Rendered::Text(display_raw(value))
        }
        (AnswerShape::ScalarEnumId | AnswerShape::SetOfEnumId, Some(value)) => {
            render_choices(question, shape, value)
        }
        (AnswerShape::Date, Some(value)) => {
            let formatted = value
                .as_str()
                .and_then(parse_date)
                .map(|date| options.date_style.format(date));
            Rendered::Text(formatted.unwrap_or_else(|| display_raw(value)))
        }
    }
}

/// Download URL for a file question's answer. The attachment entry wins;
/// otherwise the stored answer is itself the file reference.
pub fn file_url<F>(question: &QuestionSpec, response: &Response, files: &F) -> Option<String>
where
    F: FileStore + ?Sized,
{
    if question.answer_shape() != AnswerShape::FileRef {
        return None;
    }
    if let Some(reference) = response.attachments.get(question.id.as_str()) {
        return files.resolve_url(reference);
    }
    response
        .answer(question.id.as_str())
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .and_then(|text| files.resolve_url(&FileRef::new(text)))
}

/// Renders every answer of `response` in schema order, followed by answers
/// whose question has since been removed.
pub fn render_response<F>(
    form: &FormSpec,
    response: &Response,
    files: &F,
    options: &RenderOptions,
) -> Vec<RenderedAnswer>
where
    F: FileStore + ?Sized,
{
    let mut rendered: Vec<RenderedAnswer> = form
        .questions
        .iter()
        .map(|question| {
            let url = file_url(question, response, files);
            RenderedAnswer {
                question_id: question.id.clone(),
                label: question.label.clone(),
                value: render(
                    question,
                    response.answer(question.id.as_str()),
                    url.as_deref(),
                    options,
                ),
                orphaned: false,
            }
        })
        .collect();

    for (question_id, value) in &response.answers {
        if form.question(question_id.as_str()).is_some() {
            continue;
        }
        let value = if value.is_null() {
            Rendered::Empty
        } else {
            Rendered::Text(display_raw(value))
        };
        rendered.push(RenderedAnswer {
            question_id: question_id.clone(),
            label: question_id.to_string(),
            value,
            orphaned: true,
        });
    }

    rendered
}

fn render_choices(question: &QuestionSpec, shape: AnswerShape, value: &Value) -> Rendered {
    match value {
        Value::Array(items) => {
            let texts: Vec<String> = items
                .iter()
                .filter(|item| !is_empty_answer(AnswerShape::ScalarText, Some(*item)))
                .map(|item| match id_text(item) {
                    Some(id) => resolve_option(question, &id),
                    None => display_raw(item),
                })
                .collect();
            match (shape, texts.as_slice()) {
                (AnswerShape::ScalarEnumId, [single]) => Rendered::Text(single.clone()),
                _ => Rendered::List(texts),
            }
        }
        other => match id_text(other) {
            Some(id) => Rendered::Text(resolve_option(question, &id)),
            None => Rendered::Text(display_raw(other)),
        },
    }
}

/// Option text for `id`, or the id itself when the option is gone.
fn resolve_option(question: &QuestionSpec, id: &str) -> String {
    question
        .option_text(id)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

/// Option ids may be stored as strings or, in older payloads, numbers.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        other => other.to_string(),
    }
}
