use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{Actor, OptionId};
use crate::stamp::Stamp;

/// One selectable answer of a choice-like question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    pub id: OptionId,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<Actor>,
}

impl OptionSpec {
    pub fn new(text: impl Into<String>, stamp: &Stamp) -> Self {
        Self {
            id: OptionId::generate(),
            text: text.into(),
            created_by: Some(stamp.actor.clone()),
            created_at: Some(stamp.at),
            last_modified_at: Some(stamp.at),
            last_modified_by: Some(stamp.actor.clone()),
        }
    }

    pub(crate) fn touch(&mut self, stamp: &Stamp) {
        self.last_modified_at = Some(stamp.at);
        self.last_modified_by = Some(stamp.actor.clone());
    }
}
