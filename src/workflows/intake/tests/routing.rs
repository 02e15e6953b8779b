use super::common::*;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    (status, read_json_body(response).await)
}

fn upload_request(query: &str, mime_type: &str, bytes: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/intake/documents?{query}"))
        .header(header::CONTENT_TYPE, mime_type)
        .body(Body::from(bytes))
        .expect("request")
}

fn prefilled_router() -> Router {
    let mut session = session();
    session.edit(|data| *data = complete_intake(5)).expect("editable");
    let (service, _) = service_with(session);
    router_for(service)
}

#[tokio::test]
async fn session_view_reports_first_stage() {
    let (service, _) = service_with(session());
    let router = router_for(service);

    let (status, body) = call(&router, request(Method::GET, "/api/v1/intake", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"]["current"], json!(1));
    assert_eq!(body["stage"]["status"], json!("in_progress"));
    assert_eq!(body["stage"]["documentCount"], json!(2));
    assert_eq!(body["data"]["vehicles"], json!([]));
}

#[tokio::test]
async fn incomplete_stage_returns_attributable_errors() {
    let (service, _) = service_with(session());
    let router = router_for(service);

    let (status, _) = call(
        &router,
        request(
            Method::PUT,
            "/api/v1/intake/fields",
            Some(json!({ "path": "knockout.authorityRevoked", "value": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["stage"], json!(1));
    let paths: Vec<&str> = body["errors"]
        .as_array()
        .expect("error list")
        .iter()
        .filter_map(|error| error["path"].as_str())
        .collect();
    assert!(paths.contains(&"knockout.fraudConviction"));
    assert!(!paths.contains(&"knockout.authorityRevoked"));

    let (status, body) = call(&router, request(Method::GET, "/api/v1/intake/errors", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(false));
}

#[tokio::test]
async fn field_errors_map_to_bad_request() {
    let (service, _) = service_with(session());
    let router = router_for(service);

    let (status, body) = call(
        &router,
        request(
            Method::PUT,
            "/api/v1/intake/fields",
            Some(json!({ "path": "riskProfile.fleetSize", "value": "many" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("message").contains("riskProfile.fleetSize"));

    let (status, _) = call(
        &router,
        request(
            Method::PUT,
            "/api/v1/intake/fields",
            Some(json!({ "path": "vehicles[one].vin", "value": "x" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn jumps_are_limited_to_reached_stages() {
    let router = prefilled_router();

    let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/jump/3", None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/jump/9", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = call(&router, request(Method::POST, "/api/v1/intake/jump/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], json!(1));
    assert_eq!(body["highest"], json!(3));

    let (status, body) = call(&router, request(Method::POST, "/api/v1/intake/jump/3", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], json!("Business Details"));

    let (_, body) = call(&router, request(Method::POST, "/api/v1/intake/retreat", None)).await;
    assert_eq!(body["current"], json!(2));
}

#[tokio::test]
async fn disqualifying_answer_suspends_navigation() {
    let router = prefilled_router();

    let (status, body) = call(
        &router,
        request(
            Method::PUT,
            "/api/v1/intake/fields",
            Some(json!({ "path": "knockout.insuranceCancelledNonPayment", "value": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("disqualified"));

    let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn uploads_are_validated_before_storage() {
    let router = prefilled_router();

    let unsupported = upload_request(
        "type=loss_runs&fileName=runs.gif&mimeType=image/gif",
        "image/gif",
        b"GIF89a",
    );
    let (status, _) = call(&router, unsupported).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let unknown = upload_request(
        "type=bill_of_lading&fileName=bol.pdf&mimeType=application/pdf",
        "application/pdf",
        b"%PDF-1.4",
    );
    let (status, _) = call(&router, unknown).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let empty = upload_request(
        "type=loss_runs&fileName=runs.pdf&mimeType=application/pdf",
        "application/pdf",
        b"",
    );
    let (status, _) = call(&router, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn package_requires_submission_then_downloads_archive() {
    let router = prefilled_router();

    let (status, _) = call(&router, request(Method::GET, "/api/v1/intake/package", None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    for _ in 0..3 {
        let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"][0]["message"],
        json!("Please upload required documents: authority letter")
    );

    let letter = upload_request(
        "type=authority_letter&fileName=authority.pdf&mimeType=application/pdf",
        "application/pdf",
        b"%PDF-1.4 authority letter",
    );
    let (status, body) = call(&router, letter).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], json!("authority_letter"));
    assert_eq!(body["fileSize"], json!(25));

    let (status, body) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submitted"], json!(true));
    assert_eq!(body["stage"]["documentCount"], json!(4));

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/v1/intake/package", None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/gzip"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Intake_Submission_Prairie_Line_Freight_LLC_2025-06-15.tar.gz\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .expect("archive body");
    let names: Vec<String> = unpack(&bytes).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names.len(), 4);
    assert_eq!(names[3], "MC_DOT_Authority_Letter_Prairie_Line_Freight_LLC.pdf");
}

#[tokio::test]
async fn restart_returns_to_a_blank_first_stage() {
    let router = prefilled_router();
    call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;

    let (status, body) = call(&router, request(Method::POST, "/api/v1/intake/restart", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], json!(1));
    assert_eq!(body["highest"], json!(1));

    let (_, body) = call(&router, request(Method::GET, "/api/v1/intake", None)).await;
    assert_eq!(body["data"]["business"]["legalName"], json!(""));
}

#[tokio::test]
async fn submitted_intake_is_frozen_and_packages_what_was_submitted() {
    let router = prefilled_router();
    let letter = upload_request(
        "type=authority_letter&fileName=authority.pdf&mimeType=application/pdf",
        "application/pdf",
        b"%PDF-1.4 authority letter",
    );
    call(&router, letter).await;
    for _ in 0..4 {
        let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/advance", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    for (path, value) in [
        ("knockout.fraudConviction", json!(true)),
        ("vehicles", json!([])),
        ("documents", json!([])),
    ] {
        let (status, _) = call(
            &router,
            request(
                Method::PUT,
                "/api/v1/intake/fields",
                Some(json!({ "path": path, "value": value })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "edit to {path} after submission");
    }
    let late = upload_request(
        "type=loss_runs&fileName=runs.pdf&mimeType=application/pdf",
        "application/pdf",
        b"%PDF-1.4 runs",
    );
    let (status, _) = call(&router, late).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&router, request(Method::GET, "/api/v1/intake", None)).await;
    assert_eq!(body["stage"]["status"], json!("submitted"));
    assert_eq!(body["data"]["vehicles"].as_array().map(Vec::len), Some(5));

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/v1/intake/package", None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .expect("archive body");
    assert_eq!(unpack(&bytes).len(), 4);
}

#[tokio::test]
async fn restart_evicts_uploaded_bytes() {
    let mut session = session();
    session.edit(|data| *data = complete_intake(2)).expect("editable");
    let (service, uploads) = service_with(session);
    let router = router_for(service);

    let letter = upload_request(
        "type=authority_letter&fileName=authority.pdf&mimeType=application/pdf",
        "application/pdf",
        b"%PDF-1.4 authority letter",
    );
    let (status, _) = call(&router, letter).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploads.len(), 1);

    let (status, _) = call(&router, request(Method::POST, "/api/v1/intake/restart", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(uploads.is_empty());
}
