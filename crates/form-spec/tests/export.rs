use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use form_spec::{
    Actor, DateStyle, FormSpec, MemoryFileStore, MemoryFormStore, MemoryResponseStore, NoFiles,
    RenderOptions, Response, ResponseId, ResponsePayload, csv_headers, csv_row, export_csv,
    save_form, submit_response,
};

fn form(value: Value) -> FormSpec {
    serde_json::from_value(value).expect("deserialize")
}

fn two_question_form() -> FormSpec {
    form(json!({
        "title": "Lunch",
        "questions": [
            { "id": "who", "type": "short_text", "label": "Name" },
            {
                "id": "dish",
                "type": "single_choice",
                "label": "Dish",
                "options": [
                    { "id": "soup", "text": "Soup" },
                    { "id": "salad", "text": "Salad" }
                ]
            }
        ]
    }))
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 21, 12, minute, 7)
        .single()
        .expect("timestamp")
}

fn parse(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);
    reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[test]
fn export_has_fixed_columns_then_one_per_question() {
    let forms = MemoryFormStore::new();
    let responses = MemoryResponseStore::new();
    let saved = save_form(&forms, &two_question_form()).expect("save");
    let id = saved.id.clone().expect("id");

    for (minute, respondent, answers) in [
        (1, Some(Actor::new("ada")), json!({ "who": "Ada", "dish": "soup" })),
        (2, None, json!({ "dish": "salad" })),
    ] {
        let payload = ResponsePayload {
            form_id: id.clone(),
            answers: serde_json::from_value(answers).expect("answers"),
            attachments: Default::default(),
        };
        submit_response(&forms, &responses, payload, respondent, at(minute)).expect("submit");
    }

    let bytes = export_csv(&forms, &responses, &NoFiles, &id, &RenderOptions::default())
        .expect("export");
    let rows = parse(&bytes);
    assert_eq!(
        rows,
        vec![
            vec!["Respondent", "Submitted At", "Name", "Dish"],
            vec!["", "2025-05-21 12:02:07", "", "Salad"],
            vec!["ada", "2025-05-21 12:01:07", "Ada", "Soup"],
        ]
    );
}

#[test]
fn export_of_unknown_form_fails() {
    let forms = MemoryFormStore::new();
    let responses = MemoryResponseStore::new();
    let result = export_csv(
        &forms,
        &responses,
        &NoFiles,
        &"missing".into(),
        &RenderOptions::default(),
    );
    assert!(result.is_err());
}

#[test]
fn cells_use_rendered_values() {
    let survey: FormSpec =
        serde_json::from_str(include_str!("../tests/fixtures/survey_form.json"))
            .expect("deserialize");
    let files = MemoryFileStore::with_base_url("https://files.example");
    let response = Response {
        id: ResponseId::new("7"),
        form_id: "survey".into(),
        respondent: None,
        submitted_at: at(30),
        answers: serde_json::from_value(json!({
            "name": "Ada",
            "city": "lis",
            "activities": ["hike", "food"],
            "arrival": "2025-06-02",
            "passport": "scan.png"
        }))
        .expect("answers"),
        attachments: Default::default(),
    };
    let options = RenderOptions {
        date_style: DateStyle::Iso,
    };

    assert_eq!(csv_headers(&survey).len(), 2 + survey.questions.len());
    assert_eq!(
        csv_row(&survey, &response, &files, &options),
        vec![
            "",
            "2025-05-21 12:30:07",
            "Ada",
            "",
            "Lisbon",
            "Hiking, Food tour",
            "2025-06-02",
            "",
            "File uploaded",
        ]
    );
}
