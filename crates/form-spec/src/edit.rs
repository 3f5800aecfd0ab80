//! Schema mutations.
//!
//! Every operation borrows the current form and returns a new one; the input
//! is never modified. A rejected edit returns an [`EditError`] and no form,
//! so callers keep what they had. Successful edits stamp `lastModifiedAt/By`
//! on the form and on the question or option they touched.

use crate::error::EditError;
use crate::ids::{OptionId, QuestionId};
use crate::registry::QuestionType;
use crate::spec::{FormSpec, MIN_CHOICE_OPTIONS, OptionSpec, QuestionSpec};
use crate::stamp::Stamp;

/// Form-level fields that can be edited.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Title(String),
    Description(Option<String>),
}

/// Question-level fields that can be edited.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionField {
    /// Switching to a kind without options clears the option list.
    Type(QuestionType),
    Label(String),
    Description(Option<String>),
    Required(bool),
}

pub fn update_form_field(form: &FormSpec, field: FormField, stamp: &Stamp) -> FormSpec {
    let mut next = form.clone();
    match field {
        FormField::Title(title) => next.title = title,
        FormField::Description(description) => next.description = description,
    }
    next.touch(stamp);
    next
}

/// Appends a blank `short_text` question.
pub fn add_question(form: &FormSpec, stamp: &Stamp) -> FormSpec {
    let mut next = form.clone();
    next.questions.push(QuestionSpec::new(stamp));
    next.touch(stamp);
    next
}

/// Appends a deep copy of `question_id` with fresh ids and a copy marker on
/// its label.
pub fn duplicate_question(
    form: &FormSpec,
    question_id: &QuestionId,
    stamp: &Stamp,
) -> Result<FormSpec, EditError> {
    let source = form
        .question(question_id.as_str())
        .ok_or_else(|| EditError::QuestionNotFound(question_id.clone()))?;
    let mut copy = source.duplicate(stamp);
    // The copy must never shadow an existing question.
    while form.question(copy.id.as_str()).is_some() {
        copy.id = QuestionId::generate();
    }

    let mut next = form.clone();
    next.questions.push(copy);
    next.touch(stamp);
    Ok(next)
}

pub fn update_question_field(
    form: &FormSpec,
    question_id: &QuestionId,
    field: QuestionField,
    stamp: &Stamp,
) -> Result<FormSpec, EditError> {
    edit_question(form, question_id, stamp, |question| {
        match field {
            QuestionField::Type(kind) => {
                question.kind = kind;
                if !kind.uses_options() {
                    question.options.clear();
                }
            }
            QuestionField::Label(label) => question.label = label,
            QuestionField::Description(description) => question.description = description,
            QuestionField::Required(required) => question.required = required,
        }
        Ok(())
    })
}

/// Removes a question. Remaining question ids are left as they are.
pub fn delete_question(
    form: &FormSpec,
    question_id: &QuestionId,
    stamp: &Stamp,
) -> Result<FormSpec, EditError> {
    let position = form
        .question_position(question_id.as_str())
        .ok_or_else(|| EditError::QuestionNotFound(question_id.clone()))?;
    let mut next = form.clone();
    next.questions.remove(position);
    next.touch(stamp);
    Ok(next)
}

/// Appends an option with empty text to a choice-like question.
pub fn add_option(
    form: &FormSpec,
    question_id: &QuestionId,
    stamp: &Stamp,
) -> Result<FormSpec, EditError> {
    edit_question(form, question_id, stamp, |question| {
        if !question.uses_options() {
            return Err(EditError::OptionsNotSupported(question.id.clone()));
        }
        let mut option = OptionSpec::new("", stamp);
        while question.option(option.id.as_str()).is_some() {
            option.id = OptionId::generate();
        }
        question.options.push(option);
        Ok(())
    })
}

pub fn update_option_text(
    form: &FormSpec,
    question_id: &QuestionId,
    option_id: &OptionId,
    text: impl Into<String>,
    stamp: &Stamp,
) -> Result<FormSpec, EditError> {
    let text = text.into();
    edit_question(form, question_id, stamp, |question| {
        let option = question
            .options
            .iter_mut()
            .find(|option| option.id == *option_id)
            .ok_or_else(|| EditError::OptionNotFound {
                question: question_id.clone(),
                option: option_id.clone(),
            })?;
        option.text = text;
        option.touch(stamp);
        Ok(())
    })
}

/// Removes an option. Refused when a choice-like question would drop below
/// [`MIN_CHOICE_OPTIONS`]; callers can check [`FormSpec::can_delete_option`]
/// up front.
pub fn delete_option(
    form: &FormSpec,
    question_id: &QuestionId,
    option_id: &OptionId,
    stamp: &Stamp,
) -> Result<FormSpec, EditError> {
    edit_question(form, question_id, stamp, |question| {
        let position = question
            .options
            .iter()
            .position(|option| option.id == *option_id)
            .ok_or_else(|| EditError::OptionNotFound {
                question: question_id.clone(),
                option: option_id.clone(),
            })?;
        if question.uses_options() && question.options.len() <= MIN_CHOICE_OPTIONS {
            return Err(EditError::OptionFloor {
                question: question_id.clone(),
                count: question.options.len(),
            });
        }
        question.options.remove(position);
        Ok(())
    })
}

fn edit_question<F>(
    form: &FormSpec,
    question_id: &QuestionId,
    stamp: &Stamp,
    apply: F,
) -> Result<FormSpec, EditError>
where
    F: FnOnce(&mut QuestionSpec) -> Result<(), EditError>,
{
    let position = form
        .question_position(question_id.as_str())
        .ok_or_else(|| EditError::QuestionNotFound(question_id.clone()))?;
    let mut next = form.clone();
    let question = &mut next.questions[position];
    apply(question)?;
    question.touch(stamp);
    next.touch(stamp);
    Ok(next)
}
