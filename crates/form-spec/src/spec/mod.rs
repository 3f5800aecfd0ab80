pub mod form;
pub mod option;
pub mod question;

pub use form::{FIRST_VERSION, FormSpec, FormSummary};
pub use option::OptionSpec;
pub use question::{COPY_SUFFIX, MIN_CHOICE_OPTIONS, QuestionSpec};
