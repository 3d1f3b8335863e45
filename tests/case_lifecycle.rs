use crux_core::testing::AppTester;

use reunite_shared::capabilities::{HttpHeaders, HttpMethod, HttpRequest, HttpResponse};
use reunite_shared::model::{CaseDraft, CaseId, MediaAttachment, Model, Screen};
use reunite_shared::{App, ClientConfig, Effect, ErrorKind, Event};

fn started_authenticated(is_admin: bool) -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(
        Event::AppStarted {
            config: ClientConfig::default(),
        },
        &mut model,
    );
    app.update(
        Event::LoginSubmitted {
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
        },
        &mut model,
    );
    app.update(
        Event::LoginResponded(ok_json(serde_json::json!({
            "token": "tok-abc",
            "user": {"id": "u1", "email": "user@example.com", "is_admin": is_admin},
        }))),
        &mut model,
    );
    (app, model)
}

fn http_requests(effects: &[Effect]) -> Vec<&HttpRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request.operation.request()),
            _ => None,
        })
        .collect()
}

fn ok_json(value: serde_json::Value) -> Box<reunite_shared::HttpResult> {
    Box::new(Ok(HttpResponse::new(
        200,
        HttpHeaders::new(),
        serde_json::to_vec(&value).unwrap(),
    )))
}

fn status(code: u16, body: serde_json::Value) -> Box<reunite_shared::HttpResult> {
    Box::new(Ok(HttpResponse::new(
        code,
        HttpHeaders::new(),
        serde_json::to_vec(&body).unwrap(),
    )))
}

fn photo() -> MediaAttachment {
    MediaAttachment {
        file_name: "jane.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        data: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

fn case_json(id: &str, is_found: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id, "name": "Jane Doe", "address": null, "email": null,
        "phone": null, "photo_url": "/uploads/jane.jpg", "is_found": is_found,
        "created_by": "u1", "created_at": 1_700_000_000_000u64,
    })
}

#[test]
fn create_without_photo_fails_locally_with_no_network_call() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::CaseDraftUpdated(Box::new(CaseDraft {
            name: "Jane Doe".to_string(),
            ..CaseDraft::default()
        })),
        &mut model,
    );

    let update = app.update(Event::CaseSubmitted, &mut model);
    assert!(http_requests(&update.effects).is_empty());
    assert_eq!(
        model.active_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::Validation)
    );
    assert!(!model.in_flight.creating_case);
}

#[test]
fn create_with_blank_name_fails_locally() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::CaseDraftUpdated(Box::new(CaseDraft {
            name: "   ".to_string(),
            photo: Some(photo()),
            ..CaseDraft::default()
        })),
        &mut model,
    );

    let update = app.update(Event::CaseSubmitted, &mut model);
    assert!(http_requests(&update.effects).is_empty());
    assert_eq!(
        model.active_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::Validation)
    );
}

#[test]
fn create_with_name_and_photo_posts_multipart_and_lists_the_case() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::CaseDraftUpdated(Box::new(CaseDraft {
            name: "Jane Doe".to_string(),
            photo: Some(photo()),
            ..CaseDraft::default()
        })),
        &mut model,
    );

    let update = app.update(Event::CaseSubmitted, &mut model);
    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method(), HttpMethod::Post);
    assert!(requests[0].url().as_str().ends_with("/cases/"));
    assert!(requests[0]
        .headers()
        .get("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));
    assert_eq!(
        requests[0].headers().get("authorization"),
        Some("Bearer tok-abc")
    );

    app.update(
        Event::CaseCreateResponded(ok_json(case_json("c1", false))),
        &mut model,
    );
    assert_eq!(model.my_cases.len(), 1);
    assert_eq!(model.case_draft, CaseDraft::default());
    assert_eq!(model.screen, Screen::MyCases);

    let view = app.view(&model);
    assert_eq!(view.my_cases.active.len(), 1);
    assert!(view.my_cases.found.is_empty());
}

#[test]
fn double_submit_is_ignored_while_create_is_in_flight() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::CaseDraftUpdated(Box::new(CaseDraft {
            name: "Jane Doe".to_string(),
            photo: Some(photo()),
            ..CaseDraft::default()
        })),
        &mut model,
    );

    let first = app.update(Event::CaseSubmitted, &mut model);
    assert_eq!(http_requests(&first.effects).len(), 1);

    let second = app.update(Event::CaseSubmitted, &mut model);
    assert!(http_requests(&second.effects).is_empty());
}

#[test]
fn case_detail_is_fetched_by_id_and_lands_in_the_view() {
    let (app, mut model) = started_authenticated(false);

    let update = app.update(
        Event::CaseDetailRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method(), HttpMethod::Get);
    assert!(requests[0].url().as_str().ends_with("/cases/c1"));
    assert_eq!(
        requests[0].headers().get("authorization"),
        Some("Bearer tok-abc")
    );

    // A second request while one is outstanding is ignored.
    let second = app.update(
        Event::CaseDetailRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    assert!(http_requests(&second.effects).is_empty());

    app.update(
        Event::CaseDetailResponded {
            case_id: CaseId::new("c1"),
            result: ok_json(case_json("c1", false)),
        },
        &mut model,
    );
    assert!(!model.in_flight.loading_case_detail);
    assert_eq!(
        model.case_detail.as_ref().map(|c| c.name.as_str()),
        Some("Jane Doe")
    );

    let view = app.view(&model);
    let card = view.case_detail.unwrap();
    assert_eq!(card.id, "c1");
    assert!(!card.is_found);
}

#[test]
fn case_detail_for_a_missing_case_is_not_found() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::CaseDetailRequested {
            case_id: CaseId::new("nope"),
        },
        &mut model,
    );
    app.update(
        Event::CaseDetailResponded {
            case_id: CaseId::new("nope"),
            result: status(404, serde_json::json!({"detail": "Case not found"})),
        },
        &mut model,
    );
    assert!(!model.in_flight.loading_case_detail);
    assert!(model.case_detail.is_none());
    assert_eq!(
        model.active_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::NotFound)
    );
}

#[test]
fn delete_is_confirmation_gated_and_removes_only_after_success() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::MyCasesResponded(ok_json(serde_json::json!([case_json("c1", false)]))),
        &mut model,
    );
    assert_eq!(model.my_cases.len(), 1);

    // Requesting deletion only arms the confirmation.
    let update = app.update(
        Event::CaseDeleteRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    assert!(http_requests(&update.effects).is_empty());
    assert!(app.view(&model).confirmation.is_some());
    assert_eq!(model.my_cases.len(), 1);

    // Dismissal cancels without side effects.
    app.update(Event::ConfirmationDismissed, &mut model);
    assert!(model.pending_confirmation.is_none());
    assert_eq!(model.my_cases.len(), 1);

    // Re-arm and accept.
    app.update(
        Event::CaseDeleteRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    let update = app.update(Event::ConfirmationAccepted, &mut model);
    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method(), HttpMethod::Delete);
    assert!(requests[0].url().as_str().ends_with("/cases/c1"));
    // Still listed until the server confirms.
    assert_eq!(model.my_cases.len(), 1);

    app.update(
        Event::CaseDeleteResponded {
            case_id: CaseId::new("c1"),
            result: ok_json(serde_json::json!({"message": "deleted"})),
        },
        &mut model,
    );
    assert!(model.my_cases.is_empty());
}

#[test]
fn failed_delete_keeps_the_case() {
    let (app, mut model) = started_authenticated(false);
    app.update(
        Event::MyCasesResponded(ok_json(serde_json::json!([case_json("c1", false)]))),
        &mut model,
    );
    app.update(
        Event::CaseDeleteRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    app.update(Event::ConfirmationAccepted, &mut model);
    app.update(
        Event::CaseDeleteResponded {
            case_id: CaseId::new("c1"),
            result: status(500, serde_json::json!({})),
        },
        &mut model,
    );
    assert_eq!(model.my_cases.len(), 1);
    assert_eq!(
        model.active_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::ServerError)
    );
}

#[test]
fn mark_found_is_confirmation_gated_and_moves_case_out_of_active() {
    let (app, mut model) = started_authenticated(true);
    app.update(
        Event::MyCasesResponded(ok_json(serde_json::json!([case_json("c1", false)]))),
        &mut model,
    );

    app.update(
        Event::MarkFoundRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    let view = app.view(&model);
    assert!(view
        .confirmation
        .as_ref()
        .is_some_and(|c| c.prompt.contains("found")));

    let update = app.update(Event::ConfirmationAccepted, &mut model);
    let requests = http_requests(&update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method(), HttpMethod::Put);
    assert!(requests[0].url().as_str().ends_with("/admin/cases/c1/found"));

    app.update(
        Event::MarkFoundResponded {
            case_id: CaseId::new("c1"),
            result: ok_json(serde_json::json!({"message": "Case marked as found"})),
        },
        &mut model,
    );

    let view = app.view(&model);
    assert!(view.my_cases.active.is_empty());
    assert_eq!(view.my_cases.found.len(), 1);
    assert!(view.my_cases.found[0].is_found);
}

#[test]
fn mark_found_on_an_already_found_case_is_a_no_op() {
    let (app, mut model) = started_authenticated(true);
    app.update(
        Event::MyCasesResponded(ok_json(serde_json::json!([case_json("c1", true)]))),
        &mut model,
    );

    app.update(
        Event::MarkFoundRequested {
            case_id: CaseId::new("c1"),
        },
        &mut model,
    );
    assert!(model.pending_confirmation.is_none());
    let update = app.update(Event::ConfirmationAccepted, &mut model);
    assert!(http_requests(&update.effects).is_empty());
}
