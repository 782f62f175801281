//! HTTP client for the file translation service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::JobServiceConfig;
use crate::metrics;

use super::error::JobServiceError;
use super::traits::JobService;
use super::types::{DownloadedFile, FileCategory, MetadataUpdate, TaskMetadata};

/// File translation service client.
///
/// Keeps the last known metadata per task so partial updates can be sent as
/// full metadata documents.
pub struct HttpJobService {
    client: Client,
    config: JobServiceConfig,
    metadata: Arc<RwLock<HashMap<String, TaskMetadata>>>,
}

impl HttpJobService {
    /// Create a new client from configuration.
    pub fn new(config: JobServiceConfig) -> Result<Self, JobServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| JobServiceError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            metadata: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/file/{}", self.base_url(), task_id)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.username {
            Some(ref user) => builder.basic_auth(user, self.config.password.as_ref()),
            None => builder,
        }
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response, JobServiceError> {
        let result = self.authorized(builder).send().await;
        let label = match result {
            Ok(ref response) if response.status().is_success() => "success",
            _ => "error",
        };
        metrics::JOB_SERVICE_REQUESTS
            .with_label_values(&[operation, label])
            .inc();
        result.map_err(|e| JobServiceError::RequestFailed(e.to_string()))
    }

    async fn fetch_metadata(&self, task_id: &str) -> Result<TaskMetadata, JobServiceError> {
        let response = self
            .send("get_metadata", self.client.get(self.task_url(task_id)))
            .await?;
        let response = check_status(response).await?;
        response
            .json::<TaskMetadata>()
            .await
            .map_err(|e| JobServiceError::InvalidResponse(e.to_string()))
    }
}

/// Turn non-success responses into errors.
async fn check_status(response: Response) -> Result<Response, JobServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(JobServiceError::Http {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

#[async_trait]
impl JobService for HttpJobService {
    async fn get_metadata(&self, task_id: &str) -> Result<TaskMetadata, JobServiceError> {
        info!(task_id, "Fetching task metadata");
        let metadata = self.fetch_metadata(task_id).await?;
        self.metadata
            .write()
            .await
            .insert(task_id.to_string(), metadata.clone());
        Ok(metadata)
    }

    async fn update_metadata(
        &self,
        task_id: &str,
        update: MetadataUpdate,
    ) -> Result<TaskMetadata, JobServiceError> {
        let cached = self.metadata.read().await.get(task_id).cloned();
        let mut merged = match cached {
            Some(metadata) => metadata,
            None => self.get_metadata(task_id).await?,
        };
        merged.apply(&update);

        let payload = merged.to_payload();
        debug!(task_id, ?payload, "Updating task metadata");

        let response = self
            .send(
                "update_metadata",
                self.client.put(self.task_url(task_id)).json(&payload),
            )
            .await?;
        let response = check_status(response).await?;
        let stored = response
            .json::<TaskMetadata>()
            .await
            .map_err(|e| JobServiceError::InvalidResponse(e.to_string()))?;

        self.metadata
            .write()
            .await
            .insert(task_id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn download_source(
        &self,
        task_id: &str,
        dir: &Path,
    ) -> Result<DownloadedFile, JobServiceError> {
        let metadata = self.fetch_metadata(task_id).await?;
        let source = metadata
            .source_file()
            .ok_or_else(|| JobServiceError::NoSourceFile(task_id.to_string()))?;

        let storage_name = source.storage_name();
        let path = dir.join(&storage_name);
        let url = format!("{}/File/{}/{}", self.base_url(), task_id, source.id);

        info!(task_id, file_id = %source.id, "Downloading source file");
        let response = self.send("download", self.client.get(url)).await?;
        let response = check_status(response).await?;

        let mut file = tokio::fs::File::create(&path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| JobServiceError::RequestFailed(e.to_string()))?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        info!(task_id, path = %path.display(), "Source file downloaded");
        Ok(DownloadedFile { path, storage_name })
    }

    async fn upload_file(
        &self,
        task_id: &str,
        path: &Path,
        category: FileCategory,
    ) -> Result<(), JobServiceError> {
        info!(task_id, path = %path.display(), category = category.as_str(), "Uploading file");

        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        let form = multipart::Form::new().part("file", multipart::Part::bytes(content).file_name(file_name));

        let response = self
            .send(
                "upload",
                self.client
                    .post(self.task_url(task_id))
                    .query(&[("category", category.as_str())])
                    .multipart(form),
            )
            .await?;

        if response.status() == StatusCode::CONFLICT {
            // Re-running a task uploads the same file again.
            warn!(task_id, category = category.as_str(), "File already uploaded");
            return Ok(());
        }
        check_status(response).await?;

        info!(task_id, "File upload completed");
        Ok(())
    }

    async fn release(&self, task_id: &str) {
        self.metadata.write().await.remove(task_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_service::{TaskStatus, TaskSubstatus};
    use axum::{
        body::Bytes,
        extract::{Path as AxumPath, Query, State},
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorded {
        puts: Arc<Mutex<Vec<Value>>>,
        uploads: Arc<Mutex<Vec<(String, String, Bytes)>>>,
        auth: Arc<Mutex<Vec<String>>>,
    }

    fn metadata_json() -> Value {
        json!({
            "srcLang": "en",
            "trgLang": "lv",
            "domain": null,
            "segments": 0,
            "translatedSegments": 0,
            "status": "initializing",
            "substatus": "Unspecified",
            "files": [{ "id": "src-1", "category": "Source", "extension": ".txt" }]
        })
    }

    async fn spawn(upload_status: AxumStatus) -> (String, Recorded) {
        let recorded = Recorded::default();
        let app = Router::new()
            .route(
                "/file/{task}",
                get(|headers: HeaderMap, State(r): State<Recorded>| async move {
                    if let Some(auth) = headers.get("authorization") {
                        r.auth.lock().unwrap().push(auth.to_str().unwrap().to_string());
                    }
                    Json(metadata_json())
                })
                .put(|State(r): State<Recorded>, Json(body): Json<Value>| async move {
                    r.puts.lock().unwrap().push(body.clone());
                    let mut stored = metadata_json();
                    for (key, value) in body.as_object().unwrap() {
                        stored[key] = value.clone();
                    }
                    Json(stored)
                })
                .post(
                    move |State(r): State<Recorded>,
                          headers: HeaderMap,
                          Query(query): Query<HashMap<String, String>>,
                          body: Bytes| async move {
                        let content_type = headers
                            .get("content-type")
                            .map(|v| v.to_str().unwrap().to_string())
                            .unwrap_or_default();
                        r.uploads.lock().unwrap().push((
                            query.get("category").cloned().unwrap_or_default(),
                            content_type,
                            body,
                        ));
                        upload_status
                    },
                ),
            )
            .route(
                "/File/{task}/{file}",
                get(|AxumPath((_task, file)): AxumPath<(String, String)>| async move {
                    if file == "src-1" {
                        (AxumStatus::OK, "line one\nline two\n")
                    } else {
                        (AxumStatus::NOT_FOUND, "")
                    }
                }),
            )
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), recorded)
    }

    fn service(url: String) -> HttpJobService {
        HttpJobService::new(JobServiceConfig {
            url,
            username: Some("worker".to_string()),
            password: Some("secret".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_metadata_uses_basic_auth() {
        let (url, recorded) = spawn(AxumStatus::OK).await;
        let service = service(url);

        let metadata = service.get_metadata("task-1").await.unwrap();
        assert_eq!(metadata.src_lang, "en");
        assert_eq!(metadata.files.len(), 1);

        // "worker:secret"
        assert_eq!(
            recorded.auth.lock().unwrap().as_slice(),
            &["Basic d29ya2VyOnNlY3JldA==".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_sends_merged_metadata() {
        let (url, recorded) = spawn(AxumStatus::OK).await;
        let service = service(url);

        service
            .update_metadata("task-1", MetadataUpdate::status(TaskStatus::Translating).with_segments(7))
            .await
            .unwrap();
        let stored = service
            .update_metadata("task-1", MetadataUpdate::default().with_translated_segments(3))
            .await
            .unwrap();

        assert_eq!(stored.status, TaskStatus::Translating);
        assert_eq!(stored.translated_segments, 3);

        let puts = recorded.puts.lock().unwrap().clone();
        assert_eq!(puts.len(), 2);
        assert_eq!(
            puts[1],
            json!({
                "segments": 7,
                "translatedSegments": 3,
                "status": "translating",
                "substatus": "Unspecified",
                "domain": null
            })
        );
    }

    #[tokio::test]
    async fn test_error_update_serializes_substatus() {
        let (url, recorded) = spawn(AxumStatus::OK).await;
        let service = service(url);

        service
            .update_metadata("task-1", MetadataUpdate::error(TaskSubstatus::BadFileError))
            .await
            .unwrap();

        let puts = recorded.puts.lock().unwrap().clone();
        assert_eq!(puts[0]["status"], "error");
        assert_eq!(puts[0]["substatus"], "BadFileError");
    }

    #[tokio::test]
    async fn test_download_source_writes_file() {
        let (url, _recorded) = spawn(AxumStatus::OK).await;
        let service = service(url);
        let dir = tempfile::tempdir().unwrap();

        let downloaded = service.download_source("task-1", dir.path()).await.unwrap();
        assert_eq!(downloaded.storage_name, "Source.txt");
        assert_eq!(downloaded.path, dir.path().join("Source.txt"));
        assert_eq!(
            std::fs::read_to_string(&downloaded.path).unwrap(),
            "line one\nline two\n"
        );
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_with_category() {
        let (url, recorded) = spawn(AxumStatus::OK).await;
        let service = service(url);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Source.txt");
        std::fs::write(&path, "translated text").unwrap();

        service
            .upload_file("task-1", &path, FileCategory::Translated)
            .await
            .unwrap();

        let uploads = recorded.uploads.lock().unwrap().clone();
        assert_eq!(uploads.len(), 1);
        let (category, content_type, body) = &uploads[0];
        assert_eq!(category, "Translated");
        assert!(content_type.starts_with("multipart/form-data"));
        assert!(String::from_utf8_lossy(body).contains("translated text"));
    }

    #[tokio::test]
    async fn test_upload_conflict_is_ignored() {
        let (url, _recorded) = spawn(AxumStatus::CONFLICT).await;
        let service = service(url);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Source.txt");
        std::fs::write(&path, "x").unwrap();

        assert!(service
            .upload_file("task-1", &path, FileCategory::Translated)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_upload_server_error_fails() {
        let (url, _recorded) = spawn(AxumStatus::INTERNAL_SERVER_ERROR).await;
        let service = service(url);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Source.txt");
        std::fs::write(&path, "x").unwrap();

        let err = service
            .upload_file("task-1", &path, FileCategory::Translated)
            .await
            .unwrap_err();
        assert!(matches!(err, JobServiceError::Http { status: 500, .. }));
    }
}
