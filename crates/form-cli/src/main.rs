mod logging;
mod present;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use form_spec::{
    Answers, DateStyle, FileMetadata, FileRef, FileStore, FormField, FormSpec, NoFiles,
    RenderOptions, Response, Stamp, StoreError, add_question, render_response,
    update_form_field, validate_response, validate_schema, write_csv,
};
use present::{RenderedResponse, form_outline, response_block, violation_report};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form schema and response toolkit",
    long_about = "Creates and checks form definitions, validates answers, and renders or exports stored responses"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// How dates are displayed (iso, short, medium, long).
    #[arg(long, env = "FORMKIT_DATE_STYLE", default_value = "short")]
    date_style: DateStyle,
    /// Base URL for uploaded files; file answers become download links.
    #[arg(long, value_name = "URL")]
    files_url: Option<String>,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            date_style: self.date_style,
        }
    }

    fn file_store(&self) -> Box<dyn FileStore> {
        match &self.files_url {
            Some(base) => Box::new(UrlFiles::new(base)),
            None => Box::new(NoFiles),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a blank form with one question.
    New {
        /// Form title.
        #[arg(long)]
        title: String,
        /// Who is recorded as the form's creator.
        #[arg(long, env = "FORMKIT_ACTOR", default_value = "anonymous")]
        actor: String,
        /// Write the form here instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Overwrite an existing output file.
        #[arg(long)]
        force: bool,
    },
    /// Check that a form definition is ready to be saved.
    Check {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Validate answers against a form definition.
    Validate {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the answers JSON (object keyed by question id).
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Render stored responses against the current form definition.
    Render {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to a JSON array of stored responses.
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Export stored responses as CSV, newest first.
    Export {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
        /// Write the CSV here instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Overwrite an existing output file.
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Print the JSON Schema of the form document.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init_logging(logging::level_for(cli.verbose, cli.quiet))?;
    match cli.command {
        Command::New {
            title,
            actor,
            out,
            force,
        } => run_new(title, actor, out, force),
        Command::Check { form } => run_check(form),
        Command::Validate { form, answers } => run_validate(form, answers),
        Command::Render {
            form,
            responses,
            format,
            render,
        } => run_render(form, responses, format, render),
        Command::Export {
            form,
            responses,
            out,
            force,
            render,
        } => run_export(form, responses, out, force, render),
        Command::Schema => run_schema(),
    }
}

fn run_new(title: String, actor: String, out: Option<PathBuf>, force: bool) -> CliResult<()> {
    let stamp = Stamp::now(actor);
    let form = FormSpec::new(&stamp);
    let form = update_form_field(&form, FormField::Title(title), &stamp);
    let form = add_question(&form, &stamp);
    info!(actor = %stamp.actor, "new form created");

    let mut json = serde_json::to_string_pretty(&form)?;
    json.push('\n');
    write_output(out.as_deref(), json.as_bytes(), force)
}

fn run_check(form_path: PathBuf) -> CliResult<()> {
    let form: FormSpec = read_json(&form_path)?;
    let violations = validate_schema(&form);
    print!("{}", form_outline(&form));
    print!("{}", violation_report(&violations, "Form is ready to save."));
    if violations.is_empty() {
        Ok(())
    } else {
        Err("form is not ready to save".into())
    }
}

fn run_validate(form_path: PathBuf, answers_path: PathBuf) -> CliResult<()> {
    let form: FormSpec = read_json(&form_path)?;
    let answers: Answers = read_json(&answers_path)?;
    let violations = validate_response(&form, &answers);
    print!("{}", violation_report(&violations, "Answers are valid."));
    if violations.is_empty() {
        Ok(())
    } else {
        Err("answers failed validation".into())
    }
}

fn run_render(
    form_path: PathBuf,
    responses_path: PathBuf,
    format: OutputFormat,
    args: RenderArgs,
) -> CliResult<()> {
    let form: FormSpec = read_json(&form_path)?;
    let responses = load_responses(&form, &responses_path)?;
    let files = args.file_store();
    let options = args.options();

    match format {
        OutputFormat::Text => {
            for (index, response) in responses.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                let answers = render_response(&form, response, files.as_ref(), &options);
                print!("{}", response_block(response, &answers));
            }
        }
        OutputFormat::Json => {
            let rendered: Vec<RenderedResponse<'_>> = responses
                .iter()
                .map(|response| {
                    RenderedResponse::new(
                        response,
                        render_response(&form, response, files.as_ref(), &options),
                    )
                })
                .collect();
            print_json(&rendered)?;
        }
    }
    Ok(())
}

fn run_export(
    form_path: PathBuf,
    responses_path: PathBuf,
    out: Option<PathBuf>,
    force: bool,
    args: RenderArgs,
) -> CliResult<()> {
    let form: FormSpec = read_json(&form_path)?;
    let responses = load_responses(&form, &responses_path)?;
    let files = args.file_store();

    let mut buffer = Vec::new();
    write_csv(&form, &responses, files.as_ref(), &args.options(), &mut buffer)?;
    info!(rows = responses.len(), "responses exported");
    write_output(out.as_deref(), &buffer, force)
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormSpec);
    print_json(&schema)
}

/// Stored responses for `form`, newest first. Responses recorded against a
/// different form id are skipped.
fn load_responses(form: &FormSpec, path: &Path) -> CliResult<Vec<Response>> {
    let mut responses: Vec<Response> = read_json(path)?;
    if let Some(id) = &form.id {
        let before = responses.len();
        responses.retain(|response| response.form_id == *id);
        if responses.len() != before {
            debug!(
                skipped = before - responses.len(),
                form_id = %id,
                "responses for other forms skipped"
            );
        }
    }
    responses.sort_by_key(|response| response.submitted_at);
    responses.reverse();
    Ok(responses)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let value = serde_json::from_str(&raw)
        .map_err(|err| format!("failed to parse {}: {}", path.display(), err))?;
    Ok(value)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn write_output(out: Option<&Path>, bytes: &[u8], force: bool) -> CliResult<()> {
    let Some(path) = out else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        return Ok(());
    };
    if path.exists() && !force {
        return Err(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )
        .into());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "output written");
    Ok(())
}

/// Read-only file store that links every reference under a fixed base URL.
struct UrlFiles {
    base: String,
}

impl UrlFiles {
    fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl FileStore for UrlFiles {
    fn store(&self, _bytes: &[u8], _metadata: &FileMetadata) -> Result<FileRef, StoreError> {
        Err(StoreError::Transport("file links are read-only".into()))
    }

    fn resolve_url(&self, reference: &FileRef) -> Option<String> {
        Some(format!("{}/{}", self.base, reference))
    }
}
