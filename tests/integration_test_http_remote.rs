use appointment_store::domain::models::appointment::{
    AppointmentDraft, AppointmentFilter, AppointmentPatch, AppointmentStatus,
};
use appointment_store::domain::ports::{Registration, RemoteService};
use appointment_store::error::AppError;
use appointment_store::infra::remote::HttpRemoteService;
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn appointment_json(id: &str, date: &str, time: &str, status: &str) -> Value {
    json!({
        "id": id,
        "userId": "u-1",
        "clientName": "Jane Doe",
        "email": "jane@example.com",
        "phone": "555-0100",
        "service": "Swedish Massage",
        "date": date,
        "time": time,
        "price": 90,
        "status": status,
        "paymentStatus": "pending",
        "createdAt": "2025-03-01T10:00:00Z",
        "updatedAt": "2025-03-01T10:00:00Z"
    })
}

async fn list_appointments(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let all = vec![
        appointment_json("srv-1", "2025-03-10", "10:00 AM", "confirmed"),
        appointment_json("srv-2", "2025-03-11", "11:00 AM", "pending"),
    ];
    let filtered: Vec<Value> = all
        .into_iter()
        .filter(|a| params.get("date").is_none_or(|d| a["date"] == d.as_str()))
        .filter(|a| params.get("status").is_none_or(|s| a["status"] == s.as_str()))
        .collect();
    Json(json!({ "appointments": filtered }))
}

async fn create_appointment(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["time"] == "10:00 AM" {
        return (StatusCode::CONFLICT, Json(json!({ "error": "Slot taken" })));
    }
    if body["clientName"] == "" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "clientName is required" })));
    }
    let date = body["date"].as_str().unwrap_or_default();
    let time = body["time"].as_str().unwrap_or_default();
    (
        StatusCode::CREATED,
        Json(json!({ "appointment": appointment_json("srv-9", date, time, "pending") })),
    )
}

async fn update_appointment(Path(id): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if id != "srv-1" {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Appointment not found" })));
    }
    let status = body["status"].as_str().unwrap_or("confirmed");
    (
        StatusCode::OK,
        Json(json!({ "appointment": appointment_json("srv-1", "2025-03-10", "10:00 AM", status) })),
    )
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] != "secret" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "user": { "id": "u-1", "name": "Jane", "email": body["email"], "phone": "555-0100", "role": "user" },
            "token": "tok-123"
        })),
    )
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@example.com" {
        return (StatusCode::CONFLICT, Json(json!({ "error": "Email already registered" })));
    }
    // Replayed registrations carry an opaque credential instead of a password.
    let replay = body.get("passwordHash").is_some() && body.get("password").is_none();
    let id = if replay { "u-replay" } else { "u-new" };
    (
        StatusCode::CREATED,
        Json(json!({
            "user": { "id": id, "name": body["name"], "email": body["email"] },
            "token": null
        })),
    )
}

async fn admin_users(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer admin-token");
    if !authorized {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "Admin only" })));
    }
    (
        StatusCode::OK,
        Json(json!({ "users": [{ "id": "u-1", "name": "Jane", "email": "jane@example.com", "phone": "555-0100" }] })),
    )
}

fn backend() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .route("/api/appointments", get(list_appointments).post(create_appointment))
        .route("/api/appointments/{id}", patch(update_appointment))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/admin/users", get(admin_users))
}

fn failing_backend() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "degraded" })) }))
        .route(
            "/api/appointments",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str, token: Option<&str>) -> HttpRemoteService {
    HttpRemoteService::new(
        format!("{}/api", base),
        format!("{}/health", base),
        token.map(str::to_string),
    )
    .unwrap()
}

fn draft(time: &str) -> AppointmentDraft {
    AppointmentDraft {
        user_id: Some("u-1".into()),
        client_name: "Jane Doe".into(),
        email: "jane@example.com".into(),
        phone: "555-0100".into(),
        service: "Swedish Massage".into(),
        date: "2025-03-10".into(),
        time: time.into(),
        price: 90,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_health_and_appointment_endpoints() {
    let base = serve(backend()).await;
    let remote = client(&base, None);

    assert!(remote.health().await.unwrap());

    let all = remote.list_appointments(&AppointmentFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    let monday = remote.list_appointments(&AppointmentFilter::for_date("2025-03-10")).await.unwrap();
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].status, AppointmentStatus::Confirmed);

    let created = remote.create_appointment(&draft("11:00 AM")).await.unwrap();
    assert_eq!(created.id, "srv-9");
    assert_eq!(created.time, "11:00 AM");

    let updated = remote
        .update_appointment("srv-1", &AppointmentPatch::status(AppointmentStatus::Completed))
        .await
        .unwrap();
    assert_eq!(updated.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_definitive_rejections_are_classified() {
    let base = serve(backend()).await;
    let remote = client(&base, None);

    let err = remote.create_appointment(&draft("10:00 AM")).await.unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable { ref time, .. } if time == "10:00 AM"));

    let mut invalid = draft("2:00 PM");
    invalid.client_name = String::new();
    let err = remote.create_appointment(&invalid).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == "clientName is required"));

    let err = remote.update_appointment("srv-404", &AppointmentPatch::default()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Appointment not found"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_auth_endpoints() {
    let base = serve(backend()).await;
    let remote = client(&base, None);

    let auth = remote.login("jane@example.com", "secret").await.unwrap();
    assert_eq!(auth.user.id, "u-1");
    assert_eq!(auth.token.as_deref(), Some("tok-123"));
    assert!(matches!(remote.login("jane@example.com", "nope").await, Err(AppError::Unauthorized)));

    let fresh = Registration {
        name: "Kim",
        email: "kim@example.com",
        phone: "555-0111",
        password: Some("pw"),
        password_hash: None,
    };
    assert_eq!(remote.register(&fresh).await.unwrap().user.id, "u-new");

    let replayed = Registration { password: None, password_hash: Some("$argon2id$opaque"), ..fresh.clone() };
    assert_eq!(remote.register(&replayed).await.unwrap().user.id, "u-replay");

    let taken = Registration { email: "taken@example.com", ..fresh };
    assert!(matches!(remote.register(&taken).await, Err(AppError::DuplicateEmail(ref e)) if e == "taken@example.com"));
}

#[tokio::test]
async fn test_admin_listing_sends_bearer_token() {
    let base = serve(backend()).await;

    let anonymous = client(&base, None);
    assert!(matches!(anonymous.list_users().await, Err(AppError::Unauthorized)));

    let admin = client(&base, Some("admin-token"));
    let users = admin.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "jane@example.com");
}

#[tokio::test]
async fn test_server_errors_and_outages_are_transient() {
    let base = serve(failing_backend()).await;
    let remote = client(&base, None);

    assert!(!remote.health().await.unwrap());
    let err = remote.list_appointments(&AppointmentFilter::default()).await.unwrap_err();
    assert!(matches!(err, AppError::RemoteUnavailable(_)));
    assert!(err.is_transient());

    // Nothing listens on a port we just released.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let remote = client(&dead, None);
    assert!(remote.health().await.is_err());
    let err = remote.create_appointment(&draft("11:00 AM")).await.unwrap_err();
    assert!(err.is_transient());
}
