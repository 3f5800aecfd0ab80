use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{Actor, QuestionId};
use crate::registry::{AnswerShape, QuestionType};
use crate::spec::option::OptionSpec;
use crate::stamp::Stamp;

/// Choice-like questions need at least this many options to be saved.
pub const MIN_CHOICE_OPTIONS: usize = 2;

/// Marker appended to the label of a duplicated question.
pub const COPY_SUFFIX: &str = " (Copy)";

/// A single question within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSpec {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<Actor>,
}

impl QuestionSpec {
    /// Fresh `short_text` question with an empty label.
    pub fn new(stamp: &Stamp) -> Self {
        Self::with_id(QuestionId::generate(), QuestionType::ShortText, stamp)
    }

    pub fn with_id(id: QuestionId, kind: QuestionType, stamp: &Stamp) -> Self {
        Self {
            id,
            kind,
            label: String::new(),
            description: None,
            required: false,
            options: Vec::new(),
            created_by: Some(stamp.actor.clone()),
            created_at: Some(stamp.at),
            last_modified_at: Some(stamp.at),
            last_modified_by: Some(stamp.actor.clone()),
        }
    }

    pub fn uses_options(&self) -> bool {
        self.kind.uses_options()
    }

    pub fn answer_shape(&self) -> AnswerShape {
        self.kind.answer_shape()
    }

    pub fn option(&self, id: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.id.as_str() == id)
    }

    /// Text of the option with `id`, if it still exists.
    pub fn option_text(&self, id: &str) -> Option<&str> {
        self.option(id).map(|option| option.text.as_str())
    }

    pub fn can_delete_option(&self) -> bool {
        self.uses_options() && self.options.len() > MIN_CHOICE_OPTIONS
    }

    /// Deep copy with fresh question and option ids, stamped as new.
    pub fn duplicate(&self, stamp: &Stamp) -> Self {
        let options = self
            .options
            .iter()
            .map(|option| OptionSpec::new(option.text.clone(), stamp))
            .collect();
        Self {
            id: QuestionId::generate(),
            label: format!("{}{}", self.label, COPY_SUFFIX),
            options,
            created_by: Some(stamp.actor.clone()),
            created_at: Some(stamp.at),
            last_modified_at: Some(stamp.at),
            last_modified_by: Some(stamp.actor.clone()),
            ..self.clone()
        }
    }

    pub(crate) fn touch(&mut self, stamp: &Stamp) {
        self.last_modified_at = Some(stamp.at);
        self.last_modified_by = Some(stamp.actor.clone());
    }
}
