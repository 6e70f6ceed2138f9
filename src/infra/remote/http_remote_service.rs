use std::time::Duration;
use crate::domain::models::{
    appointment::{Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch},
    user::UserProfile,
};
use crate::domain::ports::{Registration, RemoteAuth, RemoteService};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the booking backend.
pub struct HttpRemoteService {
    client: Client,
    api_url: String,
    health_url: String,
    api_token: Option<String>,
}

impl HttpRemoteService {
    pub fn new(api_url: String, health_url: String, api_token: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            health_url,
            api_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        on_conflict: impl FnOnce() -> AppError,
    ) -> Result<T, AppError> {
        let res = self.authorized(request).send().await.map_err(|e| {
            debug!("Remote request failed: {}", e);
            AppError::RemoteUnavailable(e.to_string())
        })?;

        if !res.status().is_success() {
            return Err(classify(res, on_conflict).await);
        }

        res.json::<T>().await.map_err(|e| {
            error!("Unexpected remote response body: {}", e);
            AppError::RemoteUnavailable(format!("Malformed response: {}", e))
        })
    }
}

/// Maps a non-success response onto the error taxonomy. Only server-side and
/// transport problems are transient.
async fn classify(res: Response, on_conflict: impl FnOnce() -> AppError) -> AppError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or(body);

    match status {
        StatusCode::CONFLICT => on_conflict(),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized,
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            AppError::RemoteUnavailable(format!("Remote returned {}: {}", s, message))
        }
        s => {
            error!("Unexpected remote status {}: {}", s, message);
            AppError::InternalWithMsg(format!("Remote returned {}: {}", s, message))
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Deserialize)]
struct AppointmentsResponse {
    appointments: Vec<Appointment>,
}

#[derive(Deserialize)]
struct AppointmentResponse {
    appointment: Appointment,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: UserProfile,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct UsersResponse {
    users: Vec<UserProfile>,
}

#[derive(Serialize)]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPayload<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password_hash: Option<&'a str>,
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn health(&self) -> Result<bool, AppError> {
        let res = self.client.get(&self.health_url).send().await.map_err(|e| AppError::RemoteUnavailable(e.to_string()))?;
        if !res.status().is_success() {
            return Ok(false);
        }
        Ok(res.json::<HealthResponse>().await.is_ok_and(|h| h.status == "healthy"))
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(user_id) = &filter.user_id {
            query.push(("userId", user_id.as_str()));
        }
        if let Some(status) = filter.status {
            query.push(("status", status.as_str()));
        }
        if let Some(date) = &filter.date {
            query.push(("date", date.as_str()));
        }

        let request = self.client.get(self.url("/appointments")).query(&query);
        let body: AppointmentsResponse = self
            .send(request, || AppError::InternalWithMsg("Unexpected conflict listing appointments".into()))
            .await?;
        Ok(body.appointments)
    }

    async fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment, AppError> {
        let request = self.client.post(self.url("/appointments")).json(draft);
        let body: AppointmentResponse = self
            .send(request, || AppError::slot_unavailable(&draft.date, &draft.time))
            .await?;
        Ok(body.appointment)
    }

    async fn update_appointment(&self, remote_id: &str, patch: &AppointmentPatch) -> Result<Appointment, AppError> {
        let request = self.client.patch(self.url(&format!("/appointments/{}", remote_id))).json(patch);
        let conflict = || {
            AppError::slot_unavailable(
                patch.date.as_deref().unwrap_or_default(),
                patch.time.as_deref().unwrap_or_default(),
            )
        };
        let body: AppointmentResponse = self.send(request, conflict).await?;
        Ok(body.appointment)
    }

    async fn login(&self, email: &str, password: &str) -> Result<RemoteAuth, AppError> {
        let request = self.client.post(self.url("/auth/login")).json(&LoginPayload { email, password });
        let body: AuthResponse = self.send(request, || AppError::Unauthorized).await?;
        Ok(RemoteAuth { user: body.user, token: body.token })
    }

    async fn register(&self, registration: &Registration<'_>) -> Result<RemoteAuth, AppError> {
        let payload = RegisterPayload {
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            password: registration.password,
            password_hash: registration.password_hash,
        };
        let request = self.client.post(self.url("/auth/register")).json(&payload);
        let body: AuthResponse = self
            .send(request, || AppError::DuplicateEmail(registration.email.to_string()))
            .await?;
        Ok(RemoteAuth { user: body.user, token: body.token })
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        let request = self.client.get(self.url("/auth/admin/users"));
        let body: UsersResponse = self
            .send(request, || AppError::InternalWithMsg("Unexpected conflict listing users".into()))
            .await?;
        Ok(body.users)
    }
}
