use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{Actor, FormId, QuestionId};
use crate::spec::question::QuestionSpec;
use crate::stamp::Stamp;

/// Versions start here and move only on persisted saves.
pub const FIRST_VERSION: u32 = 1;

fn first_version() -> u32 {
    FIRST_VERSION
}

/// Top-level form definition: the schema respondents answer against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    /// Absent until the form store accepts the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FormId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<Actor>,
    #[serde(default = "first_version")]
    pub version: u32,
}

/// Listing row returned by the form store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: FormId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: u32,
    pub question_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl FormSpec {
    /// A blank, unsaved form.
    pub fn new(stamp: &Stamp) -> Self {
        Self {
            id: None,
            title: String::new(),
            description: None,
            questions: Vec::new(),
            created_by: Some(stamp.actor.clone()),
            created_at: Some(stamp.at),
            last_modified_at: Some(stamp.at),
            last_modified_by: Some(stamp.actor.clone()),
            version: FIRST_VERSION,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    pub fn question(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions
            .iter()
            .find(|question| question.id.as_str() == id)
    }

    /// Zero-based position of a question in schema order.
    pub fn question_position(&self, id: &str) -> Option<usize> {
        self.questions
            .iter()
            .position(|question| question.id.as_str() == id)
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions.iter().map(|question| &question.id)
    }

    /// Current option count of a question, if it exists.
    pub fn option_count(&self, question_id: &str) -> Option<usize> {
        self.question(question_id)
            .map(|question| question.options.len())
    }

    /// Whether deleting one option from the question keeps it save-ready.
    /// Non-choice questions hold no options, so there is nothing to delete.
    pub fn can_delete_option(&self, question_id: &str) -> bool {
        self.question(question_id)
            .is_some_and(QuestionSpec::can_delete_option)
    }

    pub fn summary(&self) -> Option<FormSummary> {
        let id = self.id.clone()?;
        Some(FormSummary {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            version: self.version,
            question_count: self.questions.len(),
            last_modified_at: self.last_modified_at,
        })
    }

    pub(crate) fn touch(&mut self, stamp: &Stamp) {
        self.last_modified_at = Some(stamp.at);
        self.last_modified_by = Some(stamp.actor.clone());
    }
}
