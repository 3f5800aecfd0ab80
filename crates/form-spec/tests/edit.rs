use chrono::{TimeZone, Utc};

use form_spec::{
    EditError, FormField, FormSpec, OptionId, QuestionField, QuestionId, QuestionType, Stamp,
    add_option, add_question, delete_option, delete_question, duplicate_question,
    update_form_field, update_option_text, update_question_field, validate_schema,
};

fn stamp(actor: &str, minute: u32) -> Stamp {
    Stamp::new(
        actor,
        Utc.with_ymd_and_hms(2025, 5, 21, 6, minute, 0)
            .single()
            .expect("timestamp"),
    )
}

/// A save-ready form with one dropdown holding `options` labelled options.
fn choice_form(options: usize) -> (FormSpec, QuestionId) {
    let owner = stamp("owner", 0);
    let form = update_form_field(&FormSpec::new(&owner), FormField::Title("Lunch".into()), &owner);
    let form = add_question(&form, &owner);
    let qid = form.questions[0].id.clone();
    let mut form = update_question_field(
        &form,
        &qid,
        QuestionField::Type(QuestionType::Dropdown),
        &owner,
    )
    .expect("retype");
    form = update_question_field(&form, &qid, QuestionField::Label("Main".into()), &owner)
        .expect("label");
    for idx in 0..options {
        form = add_option(&form, &qid, &owner).expect("add option");
        let oid = form.questions[0].options[idx].id.clone();
        form = update_option_text(&form, &qid, &oid, format!("Dish {}", idx + 1), &owner)
            .expect("option text");
    }
    (form, qid)
}

#[test]
fn new_form_starts_unsaved_at_version_one() {
    let form = FormSpec::new(&stamp("owner", 0));
    assert!(form.id.is_none());
    assert_eq!(form.version, 1);
    assert!(form.questions.is_empty());
    assert_eq!(form.created_at, form.last_modified_at);
}

#[test]
fn add_question_appends_blank_short_text() {
    let (form, _) = choice_form(2);
    let next = add_question(&form, &stamp("editor", 5));
    assert_eq!(next.questions.len(), 2);
    let added = &next.questions[1];
    assert_eq!(added.kind, QuestionType::ShortText);
    assert!(added.label.is_empty());
    assert!(!added.required);
    assert!(added.options.is_empty());
    assert_eq!(next.last_modified_by.as_ref().map(|a| a.as_str()), Some("editor"));
    assert_eq!(next.version, form.version);
    // Input form is untouched.
    assert_eq!(form.questions.len(), 1);
}

#[test]
fn duplicate_copies_deeply_with_fresh_ids() {
    let (form, qid) = choice_form(3);
    let later = stamp("editor", 9);
    let next = duplicate_question(&form, &qid, &later).expect("duplicate");

    let original = &next.questions[0];
    let copy = &next.questions[1];
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.label, "Main (Copy)");
    assert_eq!(copy.kind, original.kind);
    assert_eq!(copy.options.len(), 3);
    for (copied, source) in copy.options.iter().zip(&original.options) {
        assert_eq!(copied.text, source.text);
        assert_ne!(copied.id, source.id);
        assert_eq!(copied.created_by, Some(later.actor.clone()));
        assert_eq!(copied.created_at, Some(later.at));
        assert_eq!(copied.last_modified_at, Some(later.at));
        assert_ne!(copied.created_at, source.created_at);
    }
    assert_eq!(copy.created_at, Some(later.at));
    assert_eq!(copy.created_by, Some(later.actor.clone()));
    assert_eq!(validate_schema(&next), validate_schema(&form));
}

#[test]
fn duplicate_of_missing_question_reports_not_found() {
    let (form, _) = choice_form(2);
    let missing = QuestionId::new("missing");
    assert_eq!(
        duplicate_question(&form, &missing, &stamp("editor", 1)),
        Err(EditError::QuestionNotFound(missing))
    );
}

#[test]
fn retyping_to_non_choice_clears_options() {
    let (form, qid) = choice_form(3);
    let next = update_question_field(
        &form,
        &qid,
        QuestionField::Type(QuestionType::ShortText),
        &stamp("editor", 2),
    )
    .expect("retype");
    assert!(next.questions[0].options.is_empty());
    assert!(validate_schema(&next).is_empty());
}

#[test]
fn retyping_between_choice_kinds_keeps_options() {
    let (form, qid) = choice_form(2);
    let next = update_question_field(
        &form,
        &qid,
        QuestionField::Type(QuestionType::MultipleChoice),
        &stamp("editor", 2),
    )
    .expect("retype");
    assert_eq!(next.questions[0].options, form.questions[0].options);
}

#[test]
fn delete_question_keeps_other_ids() {
    let (form, first) = choice_form(2);
    let form = add_question(&form, &stamp("owner", 1));
    let form = add_question(&form, &stamp("owner", 2));
    let kept: Vec<QuestionId> = form.questions[1..].iter().map(|q| q.id.clone()).collect();

    let next = delete_question(&form, &first, &stamp("editor", 3)).expect("delete");
    let remaining: Vec<QuestionId> = next.question_ids().cloned().collect();
    assert_eq!(remaining, kept);
    assert!(delete_question(&next, &first, &stamp("editor", 4)).is_err());
}

#[test]
fn option_floor_is_enforced() {
    let (form, qid) = choice_form(3);
    assert_eq!(form.option_count(qid.as_str()), Some(3));
    assert!(form.can_delete_option(qid.as_str()));

    let oid = form.questions[0].options[0].id.clone();
    let form = delete_option(&form, &qid, &oid, &stamp("editor", 1)).expect("delete option");
    assert_eq!(form.option_count(qid.as_str()), Some(2));
    assert!(!form.can_delete_option(qid.as_str()));

    let oid = form.questions[0].options[0].id.clone();
    assert_eq!(
        delete_option(&form, &qid, &oid, &stamp("editor", 2)),
        Err(EditError::OptionFloor {
            question: qid.clone(),
            count: 2
        })
    );
}

#[test]
fn option_operations_report_missing_targets() {
    let (form, qid) = choice_form(3);
    let missing = OptionId::new("nope");
    assert_eq!(
        update_option_text(&form, &qid, &missing, "x", &stamp("editor", 1)),
        Err(EditError::OptionNotFound {
            question: qid.clone(),
            option: missing.clone()
        })
    );
    assert!(matches!(
        delete_option(&form, &qid, &missing, &stamp("editor", 1)),
        Err(EditError::OptionNotFound { .. })
    ));
}

#[test]
fn options_are_refused_on_non_choice_questions() {
    let form = add_question(&FormSpec::new(&stamp("owner", 0)), &stamp("owner", 0));
    let qid = form.questions[0].id.clone();
    assert_eq!(
        add_option(&form, &qid, &stamp("owner", 1)),
        Err(EditError::OptionsNotSupported(qid))
    );
}

#[test]
fn form_field_edits_stamp_without_versioning() {
    let (form, _) = choice_form(2);
    let later = stamp("editor", 30);
    let next = update_form_field(
        &form,
        FormField::Description(Some("Friday only".into())),
        &later,
    );
    assert_eq!(next.description.as_deref(), Some("Friday only"));
    assert_eq!(next.last_modified_at, Some(later.at));
    assert_eq!(next.created_by, form.created_by);
    assert_eq!(next.version, form.version);
}
