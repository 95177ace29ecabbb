//! API Module
//!
//! HTTP API layer for the karaoke server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;

use axum::{
    Router,
    routing::{get, post},
};
use karaoke_engine::JobManager;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Shared state of every handler
pub type AppState = Arc<JobManager>;

/// Create the main API router with all endpoints
///
/// When `static_dir` is set, any request not matched by the API is served
/// from that directory.
pub fn create_router(manager: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Job endpoints
        .route("/api/jobs", post(job::create_job).get(job::list_jobs))
        .route("/api/jobs/{id}", get(job::get_job))
        .route("/api/jobs/{id}/download", get(job::download_output))
        .with_state(manager);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use karaoke_engine::toolchain::{ExtractedStreams, SeparatedStems, ToolError, ToolResult};
    use karaoke_engine::Toolchain;
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tower::ServiceExt;

    /// Writes placeholder artifacts; optionally fails the download
    struct StubToolchain {
        fail_download: bool,
    }

    impl StubToolchain {
        fn write(workdir: &std::path::Path, name: &str, content: &str) -> ToolResult<PathBuf> {
            let path = workdir.join(name);
            std::fs::write(&path, content).map_err(|e| ToolError::new(e.to_string()))?;
            Ok(path)
        }
    }

    impl Toolchain for StubToolchain {
        fn download(&self, _url: &str, workdir: &std::path::Path) -> ToolResult<PathBuf> {
            if self.fail_download {
                return Err(ToolError::new("Failed to download video: 404"));
            }
            Self::write(workdir, "source.mp4", "")
        }

        fn extract(
            &self,
            _video: &std::path::Path,
            workdir: &std::path::Path,
        ) -> ToolResult<ExtractedStreams> {
            Ok(ExtractedStreams {
                audio: Self::write(workdir, "audio.wav", "")?,
                video: Self::write(workdir, "video_silent.mp4", "")?,
            })
        }

        fn separate(
            &self,
            _audio: &std::path::Path,
            workdir: &std::path::Path,
        ) -> ToolResult<SeparatedStems> {
            Ok(SeparatedStems {
                vocals: Self::write(workdir, "vocals.wav", "")?,
                accompaniment: Self::write(workdir, "accompaniment.wav", "")?,
            })
        }

        fn transcribe(
            &self,
            _audio: &std::path::Path,
            workdir: &std::path::Path,
        ) -> ToolResult<PathBuf> {
            Self::write(
                workdir,
                "vocals.json",
                r#"{"segments": [{"start": 1.0, "end": 2.0, "text": "la la"}]}"#,
            )
        }

        fn merge(
            &self,
            _video: &std::path::Path,
            _audio: &std::path::Path,
            workdir: &std::path::Path,
        ) -> ToolResult<PathBuf> {
            Self::write(workdir, "karaoke_base.mp4", "")
        }

        fn overlay(
            &self,
            _video: &std::path::Path,
            _subtitles: &std::path::Path,
            workdir: &std::path::Path,
        ) -> ToolResult<PathBuf> {
            Self::write(workdir, "karaoke_final.mp4", "karaoke bytes")
        }
    }

    fn test_app(root: &std::path::Path, fail_download: bool) -> (Router, AppState) {
        let manager = Arc::new(JobManager::new(
            root.join("jobs"),
            Arc::new(StubToolchain { fail_download }),
        ));
        (create_router(Arc::clone(&manager), None), manager)
    }

    async fn send(
        app: &Router,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let body = match body {
            Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
            None => Body::empty(),
        };
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        app: &Router,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, path, body).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(json!({})))
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path(), false);

        let (status, body) = send_json(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["outstanding_jobs"], 0);
    }

    #[tokio::test]
    async fn test_create_job_requires_url() {
        let dir = tempfile::tempdir().unwrap();
        let (app, manager) = test_app(dir.path(), false);

        for body in [json!({}), json!({ "url": "" }), json!({ "url": "   " })] {
            let (status, resp) = send_json(&app, Method::POST, "/api/jobs", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(resp["error"], "url is required");
        }

        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/jobs",
            Some(json!({ "url": "ftp://example.com/video" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(manager.list_jobs().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_job_reports_unwritable_jobs_root() {
        let dir = tempfile::tempdir().unwrap();
        // a plain file where the jobs directory should be
        std::fs::write(dir.path().join("jobs"), b"").unwrap();
        let (app, manager) = test_app(dir.path(), false);

        let (status, resp) = send_json(
            &app,
            Method::POST,
            "/api/jobs",
            Some(json!({ "url": "https://example.com/watch?v=1" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            resp["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to prepare job directory")
        );
        assert!(manager.list_jobs().is_empty());
        assert_eq!(manager.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_job_lifecycle_and_download() {
        let dir = tempfile::tempdir().unwrap();
        let (app, manager) = test_app(dir.path(), false);

        let (status, created) = send_json(
            &app,
            Method::POST,
            "/api/jobs",
            Some(json!({ "url": "https://example.com/watch?v=abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["url"], "https://example.com/watch?v=abc");
        let id = created["job_id"].as_str().unwrap().to_string();

        manager.wait_idle().await;

        let (status, job) = send_json(&app, Method::GET, &format!("/api/jobs/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["status"], "completed");
        assert_eq!(job["stages"]["transcribe"]["message"], "Transcript generated");
        assert!(
            job["output_file"]
                .as_str()
                .unwrap()
                .ends_with("karaoke_final.mp4")
        );

        let req = Request::builder()
            .uri(format!("/api/jobs/{}/download", id))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            format!("attachment; filename=\"karaoke-{}.mp4\"", id).as_str()
        );
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"karaoke bytes");
    }

    #[tokio::test]
    async fn test_stages_serialize_in_pipeline_order() {
        let dir = tempfile::tempdir().unwrap();
        let (app, manager) = test_app(dir.path(), false);

        send_json(
            &app,
            Method::POST,
            "/api/jobs",
            Some(json!({ "url": "https://example.com/a" })),
        )
        .await;
        manager.wait_idle().await;

        let (_, body) = send(&app, Method::GET, "/api/jobs", None).await;
        let text = String::from_utf8(body).unwrap();
        let positions: Vec<usize> = [
            "\"download\"",
            "\"extract\"",
            "\"separate_vocals\"",
            "\"transcribe\"",
            "\"merge\"",
            "\"overlay\"",
        ]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_failed_job_cannot_be_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let (app, manager) = test_app(dir.path(), true);

        let (_, created) = send_json(
            &app,
            Method::POST,
            "/api/jobs",
            Some(json!({ "url": "https://example.com/missing" })),
        )
        .await;
        let id = created["job_id"].as_str().unwrap().to_string();
        manager.wait_idle().await;

        let (_, job) = send_json(&app, Method::GET, &format!("/api/jobs/{}", id), None).await;
        assert_eq!(job["status"], "failed");
        assert_eq!(job["error"], "Failed to download video: 404");
        assert_eq!(job["stages"]["download"]["status"], "failed");
        assert_eq!(job["stages"]["extract"]["status"], "pending");

        let (status, body) =
            send_json(&app, Method::GET, &format!("/api/jobs/{}/download", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Job not finished");
    }

    #[tokio::test]
    async fn test_unknown_jobs_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path(), false);

        let unknown = uuid::Uuid::new_v4();
        for path in [
            format!("/api/jobs/{}", unknown),
            format!("/api/jobs/{}/download", unknown),
            "/api/jobs/not-a-job".to_string(),
        ] {
            let (status, body) = send_json(&app, Method::GET, &path, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
            assert_eq!(body["error"], "Job not found");
        }
    }

    #[tokio::test]
    async fn test_list_jobs_in_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let (app, manager) = test_app(dir.path(), false);

        for url in ["https://example.com/1", "https://example.com/2"] {
            send_json(&app, Method::POST, "/api/jobs", Some(json!({ "url": url }))).await;
        }
        manager.wait_idle().await;

        let (status, jobs) = send_json(&app, Method::GET, "/api/jobs", None).await;
        assert_eq!(status, StatusCode::OK);
        let urls: Vec<&str> = jobs
            .as_array()
            .unwrap()
            .iter()
            .map(|job| job["url"].as_str().unwrap())
            .collect();
        assert_eq!(urls, ["https://example.com/1", "https://example.com/2"]);
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<h1>Karaoke</h1>").unwrap();

        let manager = Arc::new(JobManager::new(
            dir.path().join("jobs"),
            Arc::new(StubToolchain {
                fail_download: false,
            }),
        ));
        let app = create_router(manager, Some(&static_dir));

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), "<h1>Karaoke</h1>");

        let (status, _) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
