//! Hosted backend integration tests against a mock server

use echo_capture::application::ports::{
    ListFilter, NewTestimonial, SubmissionError, TestimonialStore,
};
use echo_capture::application::{ModerationError, ModerationUseCase, SubmitTestimonialUseCase};
use echo_capture::domain::capture::{CapturedArtifact, MediaMimeType};
use echo_capture::domain::testimonial::{MediaType, TestimonialForm};
use echo_capture::infrastructure::RestTestimonialStore;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "anon-test-key";

fn store(server: &MockServer) -> RestTestimonialStore {
    RestTestimonialStore::new(server.uri(), API_KEY)
}

fn row(id: &str, approved: bool, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Sarah Johnson",
        "email": "sarah@example.com",
        "company": "Acme",
        "position": "CTO",
        "text": "Collecting video testimonials took minutes.",
        "rating": 5,
        "media_type": "none",
        "media_url": null,
        "approved": approved,
        "created_at": created_at,
    })
}

fn form(media_type: MediaType) -> TestimonialForm {
    TestimonialForm {
        name: "Sarah Johnson".to_string(),
        email: "sarah@example.com".to_string(),
        company: Some("Acme".to_string()),
        position: Some("CTO".to_string()),
        text: "Collecting video testimonials took minutes.".to_string(),
        rating: 5,
        media_type,
    }
}

#[tokio::test]
async fn submit_text_only_inserts_unapproved_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/testimonials"))
        .and(header("apikey", API_KEY))
        .and(header("authorization", "Bearer anon-test-key"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "name": "Sarah Johnson",
            "media_type": "none",
            "media_url": null,
            "approved": false,
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([row("t-1", false, "2024-03-01T10:00:00Z")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let use_case = SubmitTestimonialUseCase::new(store(&server));
    let stored = use_case.execute(form(MediaType::None), None).await.unwrap();

    assert_eq!(stored.id, "t-1");
    assert!(!stored.approved);
}

#[tokio::test]
async fn submit_with_media_uploads_before_insert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/testimonial-media/[0-9a-f-]+\.webm$"))
        .and(header("content-type", "audio/webm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/testimonials"))
        .and(body_partial_json(json!({"media_type": "audio"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "t-2",
            "name": "Sarah Johnson",
            "email": "sarah@example.com",
            "text": "Collecting video testimonials took minutes.",
            "rating": 5,
            "media_type": "audio",
            "media_url": format!("{}/storage/v1/object/public/testimonial-media/x.webm", server.uri()),
            "approved": false,
            "created_at": "2024-03-01T10:00:00Z",
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = CapturedArtifact::new(vec![1u8; 30], MediaMimeType::AudioWebm);
    let stored = store(&server)
        .submit(&NewTestimonial {
            form: form(MediaType::Audio),
            media: Some(artifact),
        })
        .await
        .unwrap();

    assert!(stored.has_media());
    assert_eq!(stored.media_type, MediaType::Audio);
}

#[tokio::test]
async fn failed_upload_skips_insert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/"))
        .respond_with(
            ResponseTemplate::new(413).set_body_json(json!({"message": "Payload too large"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/testimonials"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let artifact = CapturedArtifact::new(vec![0u8; 8], MediaMimeType::VideoWebm);
    let err = store(&server)
        .submit(&NewTestimonial {
            form: form(MediaType::Video),
            media: Some(artifact),
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, SubmissionError::StorageQuota(ref m) if m == "Payload too large"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn status_codes_map_to_failure_kinds() {
    let cases = [
        (401, "unauthorized"),
        (403, "unauthorized"),
        (422, "validation"),
        (409, "validation"),
        (500, "api"),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/testimonials"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"message": "nope"})),
            )
            .mount(&server)
            .await;

        let err = store(&server).list(ListFilter::All).await.unwrap_err();
        let kind = match err {
            SubmissionError::Unauthorized => "unauthorized",
            SubmissionError::Validation(_) => "validation",
            SubmissionError::Api { status: s, .. } if s == status => "api",
            other => panic!("status {status}: unexpected {other:?}"),
        };
        assert_eq!(kind, expected, "status {status}");
    }
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let err = RestTestimonialStore::new(uri, API_KEY)
        .list(ListFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Network(_)));
}

#[tokio::test]
async fn malformed_rows_are_parse_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/testimonials"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = store(&server).list(ListFilter::All).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Parse(_)));
}

#[tokio::test]
async fn list_filters_are_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/testimonials"))
        .and(query_param("approved", "eq.true"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([row("a-1", true, "2024-03-02T10:00:00Z")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let approved = store(&server).list(ListFilter::Approved).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert!(approved[0].approved);
}

#[tokio::test]
async fn moderation_board_splits_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/testimonials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            row("p-old", false, "2024-03-01T10:00:00Z"),
            row("a-1", true, "2024-03-02T10:00:00Z"),
            row("p-new", false, "2024-03-03T10:00:00Z"),
        ])))
        .mount(&server)
        .await;

    let board = ModerationUseCase::new(store(&server)).board().await.unwrap();
    let pending: Vec<_> = board.pending.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(pending, ["p-new", "p-old"]);
    assert_eq!(board.approved.len(), 1);
}

#[tokio::test]
async fn approve_patches_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/testimonials"))
        .and(query_param("id", "eq.t-9"))
        .and(body_partial_json(json!({"approved": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([row("t-9", true, "2024-03-01T10:00:00Z")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let updated = ModerationUseCase::new(store(&server))
        .set_approved("t-9", true)
        .await
        .unwrap();
    assert!(updated.approved);
}

#[tokio::test]
async fn delete_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/testimonials"))
        .and(query_param("id", "eq.ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = ModerationUseCase::new(store(&server))
        .delete("ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(ref id) if id == "ghost"));
}
