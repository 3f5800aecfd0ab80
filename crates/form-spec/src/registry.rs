use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    ShortText,
    LongText,
    SingleChoice,
    MultipleChoice,
    Dropdown,
    Date,
    Time,
    File,
}

/// Canonical category of a stored answer. Validation and rendering dispatch on
/// this tag, never on the kind itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerShape {
    ScalarText,
    ScalarEnumId,
    SetOfEnumId,
    Date,
    Time,
    FileRef,
}

/// Static facts registered for one question kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub kind: QuestionType,
    pub name: &'static str,
    pub label: &'static str,
    pub uses_options: bool,
    pub answer_shape: AnswerShape,
}

const fn entry(
    kind: QuestionType,
    name: &'static str,
    label: &'static str,
    uses_options: bool,
    answer_shape: AnswerShape,
) -> KindInfo {
    KindInfo {
        kind,
        name,
        label,
        uses_options,
        answer_shape,
    }
}

/// The registry. Indexed by `QuestionType as usize`.
pub static REGISTRY: [KindInfo; 8] = [
    entry(
        QuestionType::ShortText,
        "short_text",
        "Short Answer",
        false,
        AnswerShape::ScalarText,
    ),
    entry(
        QuestionType::LongText,
        "long_text",
        "Paragraph",
        false,
        AnswerShape::ScalarText,
    ),
    entry(
        QuestionType::SingleChoice,
        "single_choice",
        "Multiple Choice",
        true,
        AnswerShape::ScalarEnumId,
    ),
    entry(
        QuestionType::MultipleChoice,
        "multiple_choice",
        "Checkboxes",
        true,
        AnswerShape::SetOfEnumId,
    ),
    entry(
        QuestionType::Dropdown,
        "dropdown",
        "Dropdown",
        true,
        AnswerShape::ScalarEnumId,
    ),
    entry(QuestionType::Date, "date", "Date", false, AnswerShape::Date),
    entry(QuestionType::Time, "time", "Time", false, AnswerShape::Time),
    entry(
        QuestionType::File,
        "file",
        "File Upload",
        false,
        AnswerShape::FileRef,
    ),
];

impl QuestionType {
    /// All kinds in registry order.
    pub fn all() -> impl Iterator<Item = QuestionType> {
        REGISTRY.iter().map(|info| info.kind)
    }

    pub fn info(self) -> &'static KindInfo {
        &REGISTRY[self as usize]
    }

    /// Wire name, e.g. `single_choice`.
    pub fn as_str(self) -> &'static str {
        self.info().name
    }

    /// Human label shown in builders.
    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn uses_options(self) -> bool {
        self.info().uses_options
    }

    pub fn answer_shape(self) -> AnswerShape {
        self.info().answer_shape
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_lowercase();
        REGISTRY
            .iter()
            .find(|info| info.name == needle)
            .map(|info| info.kind)
            .ok_or_else(|| format!("unknown question type '{}'", value))
    }
}

impl AnswerShape {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerShape::ScalarText => "scalar-text",
            AnswerShape::ScalarEnumId => "scalar-enum-id",
            AnswerShape::SetOfEnumId => "set-of-enum-id",
            AnswerShape::Date => "date",
            AnswerShape::Time => "time",
            AnswerShape::FileRef => "file-ref",
        }
    }

    /// Whether answers of this shape reference option ids.
    pub fn is_enum(self) -> bool {
        matches!(self, AnswerShape::ScalarEnumId | AnswerShape::SetOfEnumId)
    }
}
