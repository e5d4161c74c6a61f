pub mod health;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/upload/", post(upload::handle_upload))
        .route("/upload", post(upload::handle_upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::docx::tests::build_docx;
    use crate::extraction::pdf::tests::build_pdf;
    use crate::extraction::DocumentTextExtractor;
    use crate::fields::recognizer::HeuristicRecognizer;
    use crate::fields::skills::SkillVocabulary;
    use crate::matching::hashing::HashingEmbedder;
    use crate::matching::{CatalogIndex, JobCatalog};

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";
    const PDF_MIME: &str = "application/pdf";
    const DOCX_MIME: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

    async fn test_state(config: Config) -> AppState {
        let embedder = Arc::new(HashingEmbedder);
        let catalog = CatalogIndex::build(JobCatalog::builtin().unwrap(), embedder.as_ref())
            .await
            .unwrap();

        AppState {
            vocabulary: Arc::new(SkillVocabulary::load(&config.skills_path).unwrap()),
            config,
            text_extractor: Arc::new(DocumentTextExtractor),
            recognizer: Arc::new(HeuristicRecognizer),
            embedder,
            catalog: Arc::new(catalog),
        }
    }

    fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_upload(router: Router, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/upload/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn assert_sorted_and_bounded(matched: &[Value]) {
        let scores: Vec<f64> = matched
            .iter()
            .map(|m| m["similarity_score"].as_f64().unwrap())
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "unsorted: {scores:?}");
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn test_docx_resume_is_parsed_and_ranked() {
        let state = test_state(Config::for_tests()).await;
        let catalog_len = state.catalog.catalog().len();
        let router = build_router(state);

        let docx = build_docx(&[
            "Jane Doe",
            "jane@example.com",
            "Skills: Python, Machine Learning, SQL",
        ]);
        let (status, body) =
            post_upload(router, multipart_body("file", "jane.docx", DOCX_MIME, &docx)).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["filename"], "jane.docx");
        assert_eq!(body["parsed_data"]["name"], "Jane Doe");
        assert_eq!(body["parsed_data"]["email"], "jane@example.com");
        assert_eq!(
            body["parsed_data"]["skills"],
            "python machine-learning sql"
        );

        let matched = body["matched_jobs"].as_array().unwrap();
        assert_eq!(matched.len(), catalog_len);
        assert_sorted_and_bounded(matched);

        let top = matched[0]["description"].as_str().unwrap().to_lowercase();
        assert!(top.contains("python") || top.contains("machine learning"), "{top}");
        let chef_rank = matched
            .iter()
            .position(|m| m["title"] == "Pastry Chef")
            .unwrap();
        assert!(chef_rank >= 3);
    }

    #[tokio::test]
    async fn test_pdf_resume_email_is_exact() {
        let router = build_router(test_state(Config::for_tests()).await);

        let pdf = build_pdf(&[
            "Jane Doe",
            "jane@example.com",
            "Skills: Python, Machine Learning, SQL",
        ]);
        let (status, body) =
            post_upload(router, multipart_body("file", "jane.pdf", PDF_MIME, &pdf)).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["parsed_data"]["email"], "jane@example.com");
        let skills = body["parsed_data"]["skills"].as_str().unwrap();
        for skill in ["python", "machine-learning", "sql"] {
            assert!(skills.split(' ').any(|s| s == skill), "{skills}");
        }
    }

    #[tokio::test]
    async fn test_resume_without_skills_still_ranks_whole_catalog() {
        let state = test_state(Config::for_tests()).await;
        let catalog_len = state.catalog.catalog().len();
        let router = build_router(state);

        let docx = build_docx(&["Lorem ipsum dolor sit amet"]);
        let (status, body) =
            post_upload(router, multipart_body("file", "blank.docx", DOCX_MIME, &docx)).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["parsed_data"]["skills"], "");
        assert!(body["parsed_data"]["email"].is_null());
        let matched = body["matched_jobs"].as_array().unwrap();
        assert_eq!(matched.len(), catalog_len);
        assert_sorted_and_bounded(matched);
    }

    #[tokio::test]
    async fn test_text_file_is_unsupported() {
        let router = build_router(test_state(Config::for_tests()).await);

        let (status, body) = post_upload(
            router,
            multipart_body("file", "resume.txt", "text/plain", b"Jane Doe, Python"),
        )
        .await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["code"], "UNSUPPORTED_FORMAT");
        assert!(body["error"].as_str().unwrap().contains("text/plain"));
        assert!(body.get("matched_jobs").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_a_client_error() {
        let router = build_router(test_state(Config::for_tests()).await);

        let (status, body) = post_upload(
            router,
            multipart_body("file", "broken.pdf", PDF_MIME, b"%PDF-1.7\ngarbage\n%%EOF"),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_missing_file_field_is_rejected() {
        let router = build_router(test_state(Config::for_tests()).await);

        let (status, body) = post_upload(
            router,
            multipart_body("resume", "jane.pdf", PDF_MIME, b"%PDF-1.4"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_rejected_upload_is_logged_with_request_id() {
        let router = build_router(test_state(Config::for_tests()).await);

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (status, _) = post_upload(
            router,
            multipart_body("resume", "jane.pdf", PDF_MIME, b"%PDF-1.4"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|l| l.contains("Upload rejected"))
            .unwrap_or_else(|| panic!("no rejection logged: {output}"));
        assert!(line.contains("request_id="), "{line}");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let config = Config {
            max_upload_bytes: 256,
            ..Config::for_tests()
        };
        let router = build_router(test_state(config).await);

        let (status, body) = post_upload(
            router,
            multipart_body("file", "big.pdf", PDF_MIME, &[b'a'; 4096]),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_health_reports_loaded_data() {
        let router = build_router(test_state(Config::for_tests()).await);

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["embedder"], "hashing");
        assert!(body["jobs"].as_u64().unwrap() >= 3);
    }
}
