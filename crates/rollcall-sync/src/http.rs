//! HTTP client for the attendance API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use rollcall_core::{
    AttendanceRecord, NewStudent, OverviewStatistics, Student, StudentStatistics, StudentUpdate,
};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::api::{Ack, AttendanceApi, RecordFilter};
use crate::error::SyncError;

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub database: String,
}

/// HTTP client for the attendance backend's `/api` endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given backend base URL.
    ///
    /// `base_url` should be like `http://localhost:5001` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Like [`ApiClient::new`] but every request gives up after `timeout`.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    fn with_client(base_url: String, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the backend is up.
    pub async fn health(&self) -> Result<Health, SyncError> {
        self.send(Method::GET, &["health"], &[], None::<&()>).await
    }

    /// `{base}/api/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<T, SyncError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(method = %method, url = %url, "attendance api request");

        let mut req = self.client.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::from_response(status.as_u16(), &body));
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl AttendanceApi for ApiClient {
    async fn list_students(&self) -> Result<Vec<Student>, SyncError> {
        let students: Vec<Student> = self
            .send(Method::GET, &["students"], &[], None::<&()>)
            .await?;
        info!(count = students.len(), "fetched students");
        Ok(students)
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Ack, SyncError> {
        info!(student_id = %student.student_id, "creating student");
        self.send(Method::POST, &["students"], &[], Some(student))
            .await
    }

    async fn update_student(
        &self,
        student_id: &str,
        update: &StudentUpdate,
    ) -> Result<Ack, SyncError> {
        info!(student_id, "updating student");
        self.send(Method::PUT, &["students", student_id], &[], Some(update))
            .await
    }

    async fn delete_student(&self, student_id: &str) -> Result<Ack, SyncError> {
        info!(student_id, "deleting student");
        self.send(Method::DELETE, &["students", student_id], &[], None::<&()>)
            .await
    }

    async fn list_attendance(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceRecord>, SyncError> {
        let records: Vec<AttendanceRecord> = self
            .send(Method::GET, &["attendance"], &filter.query_pairs(), None::<&()>)
            .await?;
        info!(count = records.len(), ?filter, "fetched attendance records");
        Ok(records)
    }

    async fn save_attendance(&self, batch: &[AttendanceRecord]) -> Result<Ack, SyncError> {
        info!(count = batch.len(), "saving attendance batch");
        let ack: Ack = self
            .send(Method::POST, &["attendance"], &[], Some(batch))
            .await?;
        info!(message = %ack.message, "attendance saved");
        Ok(ack)
    }

    async fn overview_statistics(&self) -> Result<OverviewStatistics, SyncError> {
        self.send(Method::GET, &["statistics", "overview"], &[], None::<&()>)
            .await
    }

    async fn student_statistics(&self, student_id: &str) -> Result<StudentStatistics, SyncError> {
        self.send(
            Method::GET,
            &["statistics", "student", student_id],
            &[],
            None::<&()>,
        )
        .await
    }
}
