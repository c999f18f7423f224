use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::auth::{AuthError, Session};
use super::domain::{
    ApplicationForm, JobId, LoginRequest, NewJob, ResumeUpload, Role, SignupRequest,
};
use super::repository::{
    ApplicationRepository, JobRepository, RepositoryError, UserRepository,
};
use super::service::{JobBoardError, JobBoardService, INVALID_RESUME_MESSAGE};
use crate::screening::PageTextSource;

type SharedService<U, J, A, S> = Arc<JobBoardService<U, J, A, S>>;

/// Router exposing account, job, and application endpoints.
///
/// `max_upload_bytes` bounds request bodies so resume uploads larger than axum's
/// default limit are accepted.
pub fn job_board_router<U, J, A, S>(
    service: SharedService<U, J, A, S>,
    max_upload_bytes: usize,
) -> Router
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    Router::new()
        .route("/api/v1/auth/:role/signup", post(signup_handler::<U, J, A, S>))
        .route("/api/v1/auth/:role/login", post(login_handler::<U, J, A, S>))
        .route("/api/v1/auth/logout", post(logout_handler::<U, J, A, S>))
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<U, J, A, S>).post(post_job_handler::<U, J, A, S>),
        )
        .route("/api/v1/jobs/:job_id", delete(delete_job_handler::<U, J, A, S>))
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(applicants_handler::<U, J, A, S>).post(apply_handler::<U, J, A, S>),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Map a service error onto a status code and `{"error": ...}` body.
pub fn error_response(error: JobBoardError) -> Response {
    let status = match &error {
        JobBoardError::Auth(AuthError::InvalidRole(_)) => StatusCode::NOT_FOUND,
        JobBoardError::Auth(AuthError::InvalidCredentials | AuthError::Unauthenticated) => {
            StatusCode::UNAUTHORIZED
        }
        JobBoardError::Auth(AuthError::Forbidden { .. }) => StatusCode::FORBIDDEN,
        JobBoardError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "username already exists" });
            return (StatusCode::CONFLICT, axum::Json(payload)).into_response();
        }
        JobBoardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        JobBoardError::InvalidResume(_) => StatusCode::BAD_REQUEST,
        JobBoardError::JobNotFound(_) | JobBoardError::UploadNotFound(_) => StatusCode::NOT_FOUND,
        JobBoardError::Auth(AuthError::SessionsUnavailable)
        | JobBoardError::Repository(_)
        | JobBoardError::Io(_) => {
            error!(error = %error, "job board request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn parse_role(raw: &str) -> Result<Role, JobBoardError> {
    Role::parse(raw).ok_or_else(|| AuthError::InvalidRole(raw.to_string()).into())
}

fn session_from<U, J, A, S>(
    service: &JobBoardService<U, J, A, S>,
    headers: &HeaderMap,
) -> Result<Session, JobBoardError>
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    service.authenticate(bearer_token(headers))
}

pub(crate) async fn signup_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    Path(role): Path<String>,
    axum::Json(request): axum::Json<SignupRequest>,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let result = parse_role(&role).and_then(|role| service.signup(role, request));
    match result {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn login_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    Path(role): Path<String>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let result = parse_role(&role).and_then(|role| service.login(role, request));
    match result {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn logout_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match service.logout(token) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_jobs_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    headers: HeaderMap,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let result = session_from(&service, &headers).and_then(|session| service.list_jobs(&session));
    match result {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn post_job_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    headers: HeaderMap,
    axum::Json(job): axum::Json<NewJob>,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let result =
        session_from(&service, &headers).and_then(|session| service.post_job(&session, job));
    match result {
        Ok(posting) => (StatusCode::CREATED, axum::Json(posting)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_job_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    headers: HeaderMap,
    Path(job_id): Path<usize>,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let result = session_from(&service, &headers)
        .and_then(|session| service.delete_job(&session, JobId(job_id)));
    match result {
        Ok(deleted) => (StatusCode::OK, axum::Json(json!({ "deleted": deleted }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applicants_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    headers: HeaderMap,
    Path(job_id): Path<usize>,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let result = session_from(&service, &headers)
        .and_then(|session| service.applicants_for(&session, JobId(job_id)));
    match result {
        Ok(applicants) => (StatusCode::OK, axum::Json(applicants)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<U, J, A, S>(
    State(service): State<SharedService<U, J, A, S>>,
    headers: HeaderMap,
    Path(job_id): Path<usize>,
    multipart: Multipart,
) -> Response
where
    U: UserRepository + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: PageTextSource + 'static,
{
    let session = match session_from(&service, &headers) {
        Ok(session) => session,
        Err(error) => return error_response(error),
    };

    let (form, upload) = match read_application(multipart).await {
        Ok(parts) => parts,
        Err(message) => {
            let payload = json!({ "error": message });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let worker = Arc::clone(&service);
    let joined = tokio::task::spawn_blocking(move || {
        worker.apply(&session, JobId(job_id), form, upload)
    })
    .await;

    match joined {
        Ok(Ok(record)) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(error = %join_error, "resume screening task failed");
            let payload = json!({ "error": "resume screening failed" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// Collect the contact fields and the `resume` file from a multipart form.
async fn read_application(
    mut multipart: Multipart,
) -> Result<(ApplicationForm, ResumeUpload), String> {
    let mut form = ApplicationForm::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| format!("malformed multipart body: {err}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .and_then(|value| value.parse::<mime::Mime>().ok());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| format!("unable to read resume: {err}"))?;
                upload = Some(ResumeUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "full_name" | "email" | "phone" => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| format!("unable to read {name}: {err}"))?;
                match name.as_str() {
                    "full_name" => form.full_name = value,
                    "email" => form.email = value,
                    _ => form.phone = value,
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| INVALID_RESUME_MESSAGE.to_string())?;
    Ok((form, upload))
}
