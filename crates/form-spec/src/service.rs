//! Glue between the pure model and the stores: validate, then persist.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::answers::{Answers, NewResponse, Response, ResponsePayload};
use crate::codec::{is_empty_answer, normalize};
use crate::error::FormError;
use crate::ids::Actor;
use crate::registry::AnswerShape;
use crate::spec::{FIRST_VERSION, FormSpec};
use crate::store::{FormStore, ResponseStore};
use crate::validate::{validate_response, validate_schema};

/// Version the form will carry once its next save is accepted, or `None`
/// when its version counter is exhausted.
pub fn next_version(form: &FormSpec) -> Option<u32> {
    if form.is_saved() {
        form.version.checked_add(1)
    } else {
        Some(FIRST_VERSION)
    }
}

/// Validates `form` and persists it: unsaved forms are created, saved forms
/// are updated against the version they were loaded at. Nothing is written
/// when validation fails or the stored version has moved on.
pub fn save_form<S>(store: &S, form: &FormSpec) -> Result<FormSpec, FormError>
where
    S: FormStore + ?Sized,
{
    let violations = validate_schema(form);
    if !violations.is_empty() {
        debug!(count = violations.len(), "form schema rejected");
        return Err(FormError::Validation(violations));
    }

    let intended = match (next_version(form), &form.id) {
        (Some(version), _) => version,
        (None, Some(id)) => {
            warn!(form_id = %id, version = form.version, "form version exhausted");
            return Err(FormError::VersionExhausted {
                id: id.clone(),
                version: form.version,
            });
        }
        (None, None) => FIRST_VERSION,
    };
    let saved = match &form.id {
        None => store.create(form),
        Some(id) => store.update(id, form, form.version),
    }
    .inspect_err(|error| warn!(%error, "form save rejected by store"))?;

    if saved.version != intended {
        warn!(
            intended,
            stored = saved.version,
            "store assigned an unexpected version"
        );
    }
    info!(
        form_id = saved.id.as_ref().map(|id| id.as_str()).unwrap_or_default(),
        version = saved.version,
        questions = saved.questions.len(),
        "form saved"
    );
    Ok(saved)
}

/// Validates a submission against the form's current schema, normalizes the
/// answers and stores the response.
pub fn submit_response<F, R>(
    forms: &F,
    responses: &R,
    payload: ResponsePayload,
    respondent: Option<Actor>,
    submitted_at: DateTime<Utc>,
) -> Result<Response, FormError>
where
    F: FormStore + ?Sized,
    R: ResponseStore + ?Sized,
{
    let form = forms.get(&payload.form_id)?;
    let ResponsePayload {
        form_id,
        mut answers,
        mut attachments,
    } = payload;

    // Attachments only belong to file questions; anything else is dropped.
    let before = attachments.len();
    attachments.retain(|question_id, _| {
        form.question(question_id.as_str())
            .is_some_and(|question| question.answer_shape() == AnswerShape::FileRef)
    });
    if attachments.len() != before {
        debug!(
            form_id = %form_id,
            dropped = before - attachments.len(),
            "attachments not bound to file questions ignored"
        );
    }

    // An uploaded file answers its question even if the client sent no value.
    for (question_id, reference) in &attachments {
        if is_empty_answer(AnswerShape::FileRef, answers.get(question_id.as_str())) {
            answers.insert(question_id.clone(), reference.to_string().into());
        }
    }

    let violations = validate_response(&form, &answers);
    if !violations.is_empty() {
        debug!(form_id = %form_id, count = violations.len(), "response rejected");
        return Err(FormError::Validation(violations));
    }

    let answers = normalize_answers(&form, answers);
    let stored = responses.create(NewResponse {
        form_id,
        respondent,
        submitted_at,
        answers,
        attachments,
    })?;
    info!(
        form_id = %stored.form_id,
        response_id = %stored.id,
        anonymous = stored.is_anonymous(),
        "response stored"
    );
    Ok(stored)
}

/// Rewrites validated answers into their canonical stored form. Text keeps
/// its original spelling; keys naming no question pass through untouched.
fn normalize_answers(form: &FormSpec, mut answers: Answers) -> Answers {
    for question in &form.questions {
        let Some(value) = answers.get_mut(question.id.as_str()) else {
            continue;
        };
        if is_empty_answer(question.answer_shape(), Some(&*value)) {
            continue;
        }
        if let Ok(normalized) = normalize(question, value) {
            *value = normalized.to_json();
        }
    }
    answers
}
