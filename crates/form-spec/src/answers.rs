use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ids::{Actor, FileRef, FormId, OptionId, QuestionId, ResponseId};

/// Raw answers keyed by question id, exactly as submitted or stored.
pub type Answers = BTreeMap<QuestionId, Value>;

/// Uploaded files keyed by the id of the file question they answer.
pub type Attachments = BTreeMap<QuestionId, FileRef>;

/// What a respondent sends in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub form_id: FormId,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attachments: Attachments,
}

/// An accepted submission ready to hand to the response store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResponse {
    pub form_id: FormId,
    pub respondent: Option<Actor>,
    pub submitted_at: DateTime<Utc>,
    pub answers: Answers,
    pub attachments: Attachments,
}

/// A stored submission. Read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: ResponseId,
    pub form_id: FormId,
    /// `None` for anonymous submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent: Option<Actor>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attachments: Attachments,
}

impl Response {
    pub fn answer(&self, question_id: &str) -> Option<&Value> {
        self.answers.get(question_id)
    }

    pub fn is_anonymous(&self) -> bool {
        self.respondent.is_none()
    }
}

/// Canonical form of an answer, one variant per answer shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Choice(OptionId),
    Choices(Vec<OptionId>),
    Date(NaiveDate),
    Time(String),
    File(FileRef),
}

impl AnswerValue {
    /// JSON representation used for storage.
    pub fn to_json(&self) -> Value {
        match self {
            AnswerValue::Text(text) | AnswerValue::Time(text) => Value::String(text.clone()),
            AnswerValue::Choice(id) => Value::String(id.to_string()),
            AnswerValue::Choices(ids) => Value::Array(
                ids.iter()
                    .map(|id| Value::String(id.to_string()))
                    .collect(),
            ),
            AnswerValue::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            AnswerValue::File(reference) => Value::String(reference.to_string()),
        }
    }
}
