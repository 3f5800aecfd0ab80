#![allow(missing_docs)]

pub mod answers;
pub mod codec;
pub mod edit;
pub mod error;
pub mod export;
pub mod ids;
pub mod registry;
pub mod service;
pub mod spec;
pub mod stamp;
pub mod store;
pub mod validate;

pub use answers::{AnswerValue, Answers, Attachments, NewResponse, Response, ResponsePayload};
pub use codec::{
    DateStyle, RenderOptions, Rendered, RenderedAnswer, ShapeError, file_url, is_empty_answer,
    normalize, render, render_response,
};
pub use edit::{
    FormField, QuestionField, add_option, add_question, delete_option, delete_question,
    duplicate_question, update_form_field, update_option_text, update_question_field,
};
pub use error::{EditError, FormError, StoreError};
pub use export::{csv_headers, csv_row, export_csv, write_csv};
pub use ids::{Actor, FileRef, FormId, OptionId, QuestionId, ResponseId};
pub use registry::{AnswerShape, KindInfo, QuestionType};
pub use service::{next_version, save_form, submit_response};
pub use spec::{FormSpec, FormSummary, OptionSpec, QuestionSpec};
pub use stamp::Stamp;
pub use store::{
    FileMetadata, FileStore, FormStore, MemoryFileStore, MemoryFormStore, MemoryResponseStore,
    NoFiles, ResponseStore,
};
pub use validate::{Violation, ViolationCode, validate_response, validate_schema};
