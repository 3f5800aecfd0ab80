use std::io;

use tracing::info;

use crate::answers::Response;
use crate::codec::{RenderOptions, file_url, render};
use crate::error::FormError;
use crate::ids::FormId;
use crate::spec::FormSpec;
use crate::store::{FileStore, FormStore, ResponseStore};

pub const RESPONDENT_HEADER: &str = "Respondent";
pub const SUBMITTED_AT_HEADER: &str = "Submitted At";
pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row: the two fixed columns, then one column per question label.
pub fn csv_headers(form: &FormSpec) -> Vec<String> {
    [RESPONDENT_HEADER, SUBMITTED_AT_HEADER]
        .into_iter()
        .map(str::to_string)
        .chain(form.questions.iter().map(|question| question.label.clone()))
        .collect()
}

/// One data row. Anonymous respondents leave the first cell blank; answers
/// to removed questions are not exported.
pub fn csv_row<F>(
    form: &FormSpec,
    response: &Response,
    files: &F,
    options: &RenderOptions,
) -> Vec<String>
where
    F: FileStore + ?Sized,
{
    let respondent = response
        .respondent
        .as_ref()
        .map(|actor| actor.to_string())
        .unwrap_or_default();
    let submitted_at = response
        .submitted_at
        .format(SUBMITTED_AT_FORMAT)
        .to_string();

    let answers = form.questions.iter().map(|question| {
        let url = file_url(question, response, files);
        render(
            question,
            response.answer(question.id.as_str()),
            url.as_deref(),
            options,
        )
        .to_cell()
    });

    [respondent, submitted_at].into_iter().chain(answers).collect()
}

/// Writes `responses` as CSV, one row per response in the given order.
pub fn write_csv<W, F>(
    form: &FormSpec,
    responses: &[Response],
    files: &F,
    options: &RenderOptions,
    writer: W,
) -> Result<(), FormError>
where
    W: io::Write,
    F: FileStore + ?Sized,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(csv_headers(form))?;
    for response in responses {
        csv.write_record(csv_row(form, response, files, options))?;
    }
    csv.flush()?;
    Ok(())
}

/// Loads a form and its responses from the stores and exports them as CSV.
pub fn export_csv<S, R, F>(
    forms: &S,
    responses: &R,
    files: &F,
    form_id: &FormId,
    options: &RenderOptions,
) -> Result<Vec<u8>, FormError>
where
    S: FormStore + ?Sized,
    R: ResponseStore + ?Sized,
    F: FileStore + ?Sized,
{
    let form = forms.get(form_id)?;
    let rows = responses.list(form_id)?;
    let mut buffer = Vec::new();
    write_csv(&form, &rows, files, options, &mut buffer)?;
    info!(form_id = %form_id, rows = rows.len(), bytes = buffer.len(), "responses exported");
    Ok(buffer)
}
