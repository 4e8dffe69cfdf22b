//! reqwest implementation of [`PhysioApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{ApiError, ApiResult, PhysioApi};
use crate::config::ClientConfig;
use crate::models::{
    ApiResponse, AppointmentFlat, AppointmentRequest, LoginRequest, LoginResponse,
    MessageResponse, NewRecord, PatientDetail, PatientItem, PhysioItem, RecordItem,
};

/// HTTP gateway bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    /// Build a gateway from config.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let raw = config.normalized_base_url();
        let base_url = Url::parse(&raw)
            .map_err(|e| ApiError::Url(format!("Invalid URL '{}': {}", raw, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::Url(format!(
                "URL must use http or https scheme, got: {}",
                base_url.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve path segments against the base URL.
    ///
    /// Each segment is percent-encoded as a single path segment, so ids
    /// containing `/`, `?` or `#` cannot reach another endpoint. Empty and
    /// dot segments are rejected before any request is built.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ApiError::InvalidId(bad.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(format!("Base URL cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Request carrying `Authorization: Bearer <token>`.
    fn authed(&self, method: Method, path: &[&str], token: &str) -> ApiResult<RequestBuilder> {
        Ok(self.client.request(method, self.url(path)?).bearer_auth(token))
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &[&str]) -> ApiResult<T> {
        self.execute(self.authed(Method::GET, path, token)?).await
    }

    async fn delete<T: DeserializeOwned>(&self, token: &str, path: &[&str]) -> ApiResult<T> {
        self.execute(self.authed(Method::DELETE, path, token)?).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        token: &str,
        path: &[&str],
        body: &B,
    ) -> ApiResult<T> {
        self.execute(self.authed(method, path, token)?.json(body))
            .await
    }

    /// Send a request and decode its body.
    ///
    /// Error statuses whose body still decodes as `T` are returned as `T`, so
    /// backend envelopes with `ok=false` reach the caller with their message.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let request = builder.build()?;
        debug!(method = %request.method(), url = %request.url(), "api request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "api response");

        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(ApiError::Json(e)),
            Err(_) => Err(ApiError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

#[async_trait]
impl PhysioApi for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        let builder = self
            .client
            .post(self.url(&["auth", "login"])?)
            .json(request);
        self.execute(builder).await
    }

    async fn logout(&self, token: &str) -> ApiResult<ApiResponse<MessageResponse>> {
        self.get(token, &["auth", "logout"]).await
    }

    async fn list_patients(&self, token: &str) -> ApiResult<ApiResponse<Vec<PatientItem>>> {
        self.get(token, &["patients"]).await
    }

    async fn find_patients(
        &self,
        token: &str,
        name: Option<&str>,
        surname: Option<&str>,
    ) -> ApiResult<ApiResponse<Vec<PatientItem>>> {
        let query: Vec<(&str, &str)> = [("name", name), ("surname", surname)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
        let builder = self
            .authed(Method::GET, &["patients", "find"], token)?
            .query(&query);
        self.execute(builder).await
    }

    async fn get_patient(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PatientItem>> {
        self.get(token, &["patients", id]).await
    }

    async fn get_patient_detail(
        &self,
        token: &str,
        id: &str,
    ) -> ApiResult<ApiResponse<PatientDetail>> {
        self.get(token, &["patients", id]).await
    }

    async fn create_patient(
        &self,
        token: &str,
        patient: &PatientItem,
    ) -> ApiResult<ApiResponse<PatientItem>> {
        self.send_json(Method::POST, token, &["patients"], patient)
            .await
    }

    async fn update_patient(
        &self,
        token: &str,
        id: &str,
        patient: &PatientItem,
    ) -> ApiResult<ApiResponse<PatientItem>> {
        self.send_json(Method::PUT, token, &["patients", id], patient)
            .await
    }

    async fn delete_patient(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PatientItem>> {
        self.delete(token, &["patients", id]).await
    }

    async fn list_physios(&self, token: &str) -> ApiResult<ApiResponse<Vec<PhysioItem>>> {
        self.get(token, &["physios"]).await
    }

    async fn find_physios(
        &self,
        token: &str,
        specialty: Option<&str>,
    ) -> ApiResult<ApiResponse<Vec<PhysioItem>>> {
        let mut builder = self.authed(Method::GET, &["physios", "find"], token)?;
        if let Some(specialty) = specialty {
            builder = builder.query(&[("specialty", specialty)]);
        }
        self.execute(builder).await
    }

    async fn get_physio(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PhysioItem>> {
        self.get(token, &["physios", id]).await
    }

    async fn create_physio(
        &self,
        token: &str,
        physio: &PhysioItem,
    ) -> ApiResult<ApiResponse<PhysioItem>> {
        self.send_json(Method::POST, token, &["physios"], physio).await
    }

    async fn update_physio(
        &self,
        token: &str,
        id: &str,
        physio: &PhysioItem,
    ) -> ApiResult<ApiResponse<PhysioItem>> {
        self.send_json(Method::PUT, token, &["physios", id], physio)
            .await
    }

    async fn delete_physio(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PhysioItem>> {
        self.delete(token, &["physios", id]).await
    }

    async fn list_records(&self, token: &str) -> ApiResult<ApiResponse<Vec<RecordItem>>> {
        self.get(token, &["records"]).await
    }

    async fn get_record(&self, token: &str, id: &str) -> ApiResult<ApiResponse<RecordItem>> {
        self.get(token, &["records", id]).await
    }

    async fn create_record(
        &self,
        token: &str,
        record: &NewRecord,
    ) -> ApiResult<ApiResponse<RecordItem>> {
        self.send_json(Method::POST, token, &["records"], record)
            .await
    }

    async fn list_appointments(
        &self,
        token: &str,
    ) -> ApiResult<ApiResponse<Vec<AppointmentFlat>>> {
        self.get(token, &["records", "appointments"]).await
    }

    async fn add_appointment(
        &self,
        token: &str,
        patient_id: &str,
        request: &AppointmentRequest,
    ) -> ApiResult<ApiResponse<RecordItem>> {
        let path = ["records", "patients", patient_id, "appointments"];
        self.send_json(Method::POST, token, &path, request).await
    }

    async fn appointments_by_physio(
        &self,
        token: &str,
        physio_id: &str,
    ) -> ApiResult<ApiResponse<Vec<AppointmentFlat>>> {
        self.get(token, &["records", "physio", physio_id, "appointments"])
            .await
    }

    async fn delete_appointment(
        &self,
        token: &str,
        appointment_id: &str,
    ) -> ApiResult<ApiResponse<MessageResponse>> {
        self.delete(token, &["records", "appointments", appointment_id])
            .await
    }
}
