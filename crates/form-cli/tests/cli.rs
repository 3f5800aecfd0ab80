use assert_cmd::Command;
use serde_json::{Value, json};
use std::{error::Error, fs, path::PathBuf};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn formkit() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("formkit")?;
    cmd.env_remove("FORMKIT_DATE_STYLE")
        .env_remove("FORMKIT_ACTOR")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    Ok(path)
}

fn trip_form() -> Value {
    json!({
        "id": "trip",
        "version": 2,
        "title": "Trip",
        "questions": [
            {
                "id": "dest",
                "type": "single_choice",
                "label": "Destination",
                "required": true,
                "options": [
                    { "id": "1", "text": "Lisbon" },
                    { "id": "2", "text": "Oslo" }
                ]
            },
            { "id": "when", "type": "date", "label": "Departure" }
        ]
    })
}

fn trip_responses() -> Value {
    json!([
        {
            "id": "r1",
            "formId": "trip",
            "respondent": "ada",
            "submittedAt": "2025-05-21T09:00:00Z",
            "answers": { "dest": "1", "when": "2025-06-02" }
        },
        {
            "id": "r2",
            "formId": "trip",
            "submittedAt": "2025-05-22T10:30:00Z",
            "answers": { "dest": "2" }
        },
        {
            "id": "r3",
            "formId": "other",
            "submittedAt": "2025-05-23T10:30:00Z",
            "answers": {}
        }
    ])
}

#[test]
fn new_writes_a_blank_form_stamped_by_the_actor() -> TestResult {
    let dir = TempDir::new()?;
    let out = dir.path().join("forms").join("draft.json");

    formkit()?
        .env("FORMKIT_ACTOR", "grace")
        .args(["new", "--title", "Offsite"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let form: Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(form["title"], "Offsite");
    assert_eq!(form["version"], 1);
    assert_eq!(form["createdBy"], "grace");
    assert!(form.get("id").is_none());
    assert_eq!(form["questions"].as_array().map(Vec::len), Some(1));
    assert_eq!(form["questions"][0]["type"], "short_text");

    formkit()?
        .args(["new", "--title", "Again"])
        .arg("--out")
        .arg(&out)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn check_fails_on_a_fresh_form_and_lists_problems() -> TestResult {
    let output = formkit()?.args(["new", "--title", "Draft"]).output()?;
    assert!(output.status.success());

    let dir = TempDir::new()?;
    let form = dir.path().join("draft.json");
    fs::write(&form, &output.stdout)?;

    let assert = formkit()?
        .arg("check")
        .arg("--form")
        .arg(&form)
        .assert()
        .failure();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("Question 1 label is required"), "{}", stdout);
    Ok(())
}

#[test]
fn check_passes_a_complete_form() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(&dir, "trip.json", &trip_form())?;
    let assert = formkit()?
        .arg("check")
        .arg("--form")
        .arg(&form)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("Form is ready to save."));
    assert!(stdout.contains("Destination [Multiple Choice] *"));
    Ok(())
}

#[test]
fn validate_reports_missing_required_answers() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(&dir, "trip.json", &trip_form())?;
    let empty = write_json(&dir, "empty.json", &json!({}))?;
    let good = write_json(&dir, "good.json", &json!({ "dest": "2" }))?;

    let assert = formkit()?
        .arg("validate")
        .arg("--form")
        .arg(&form)
        .arg("--answers")
        .arg(&empty)
        .assert()
        .failure();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("\"Destination\" is required"), "{}", stdout);

    formkit()?
        .arg("validate")
        .arg("--form")
        .arg(&form)
        .arg("--answers")
        .arg(&good)
        .assert()
        .success();
    Ok(())
}

#[test]
fn render_json_resolves_options_and_dates() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(&dir, "trip.json", &trip_form())?;
    let responses = write_json(&dir, "responses.json", &trip_responses())?;

    let assert = formkit()?
        .env("FORMKIT_DATE_STYLE", "iso")
        .arg("render")
        .arg("--form")
        .arg(&form)
        .arg("--responses")
        .arg(&responses)
        .args(["--format", "json"])
        .assert()
        .success();
    let rendered: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let rendered = rendered.as_array().ok_or("expected array")?;
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0]["id"], "r2");
    assert!(rendered[0].get("respondent").is_none());
    assert_eq!(rendered[1]["answers"][0]["value"]["value"], "Lisbon");
    assert_eq!(rendered[1]["answers"][1]["value"]["value"], "2025-06-02");
    Ok(())
}

#[test]
fn render_text_shows_placeholders() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(&dir, "trip.json", &trip_form())?;
    let responses = write_json(&dir, "responses.json", &trip_responses())?;

    let assert = formkit()?
        .arg("render")
        .arg("--form")
        .arg(&form)
        .arg("--responses")
        .arg(&responses)
        .args(["--date-style", "long"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("Response r2 by anonymous at 2025-05-22 10:30:00"));
    assert!(stdout.contains("  Departure: -"));
    assert!(stdout.contains("  Departure: June 2, 2025"));
    Ok(())
}

#[test]
fn export_writes_csv_newest_first() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(&dir, "trip.json", &trip_form())?;
    let responses = write_json(&dir, "responses.json", &trip_responses())?;
    let out = dir.path().join("trip.csv");

    formkit()?
        .arg("export")
        .arg("--form")
        .arg(&form)
        .arg("--responses")
        .arg(&responses)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Respondent,Submitted At,Destination,Departure",
            ",2025-05-22 10:30:00,Oslo,",
            "ada,2025-05-21 09:00:00,Lisbon,6/2/2025",
        ]
    );
    Ok(())
}

#[test]
fn schema_describes_the_form_document() -> TestResult {
    let assert = formkit()?.arg("schema").assert().success();
    let schema: Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(schema["title"], "FormSpec");
    assert!(schema["properties"].get("questions").is_some());
    Ok(())
}

#[test]
fn unknown_date_style_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(&dir, "trip.json", &trip_form())?;
    let responses = write_json(&dir, "responses.json", &trip_responses())?;
    formkit()?
        .arg("render")
        .arg("--form")
        .arg(&form)
        .arg("--responses")
        .arg(&responses)
        .args(["--date-style", "fancy"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn files_url_links_stored_file_answers() -> TestResult {
    let dir = TempDir::new()?;
    let form = write_json(
        &dir,
        "upload.json",
        &json!({
            "id": "upload",
            "title": "Upload",
            "questions": [
                { "id": "doc", "type": "file", "label": "Document" }
            ]
        }),
    )?;
    let responses = write_json(
        &dir,
        "responses.json",
        &json!([
            {
                "id": "r1",
                "formId": "upload",
                "submittedAt": "2025-05-21T09:00:00Z",
                "answers": { "doc": "file-123" }
            }
        ]),
    )?;

    let assert = formkit()?
        .arg("export")
        .arg("--form")
        .arg(&form)
        .arg("--responses")
        .arg(&responses)
        .args(["--files-url", "https://files.example/"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Respondent,Submitted At,Document",
            ",2025-05-21 09:00:00,https://files.example/file-123",
        ]
    );

    let assert = formkit()?
        .arg("render")
        .arg("--form")
        .arg(&form)
        .arg("--responses")
        .arg(&responses)
        .args(["--files-url", "https://files.example"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(
        stdout.contains("  Document: Download: https://files.example/file-123"),
        "{}",
        stdout
    );
    Ok(())
}
