//! HTTP request handlers for the notekeep server

use crate::error::ApiError;
use crate::server::{empty_response, json_response, ResponseBody};
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use notekeep_core::auth::{login as check_login, register as create_account};
use notekeep_core::{Identity, NoteSelector, NoteStore, NoteTitle, NotekeepError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Largest request body accepted, in bytes
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const DELETE_PREFIX: &str = "/notes/delete/";

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct NoteRequest {
    title: String,
    #[serde(default)]
    content: String,
}

/// Main request handler
pub async fn handle_request<B>(req: Request<B>, state: AppState) -> Response<ResponseBody>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Handling {} {}", method, path);

    let response = match route(req, &state).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    info!("{} {} -> {}", method, path, response.status());
    response
}

async fn route<B>(req: Request<B>, state: &AppState) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (&method, path.as_str()) {
        (&Method::GET, "/health") => Ok(handle_health()),

        // `/auth/token` and `/auth/` are the paths older web clients call
        (&Method::POST, "/auth/login" | "/auth/token") => handle_login(req, state).await,
        (&Method::POST, "/auth/register" | "/auth/") => handle_register(req, state).await,

        (&Method::GET, "/") => handle_current_user(req.headers(), state),
        (&Method::POST, "/notes/save") => handle_save_note(req, state).await,
        (&Method::GET, "/notes") => handle_list_notes(req.headers(), state),
        (&Method::DELETE, p) if p.starts_with(DELETE_PREFIX) => {
            handle_delete_note(req.headers(), &p[DELETE_PREFIX.len()..], state)
        }

        (_, p) if is_known_path(p) => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::RouteNotFound),
    }
}

fn is_known_path(path: &str) -> bool {
    matches!(
        path,
        "/health" | "/auth/login" | "/auth/token" | "/auth/register" | "/auth/" | "/" | "/notes/save" | "/notes"
    ) || path.starts_with(DELETE_PREFIX)
}

/// Health check handler
fn handle_health() -> Response<ResponseBody> {
    json_response(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "service": "notekeep"
        }),
    )
}

/// POST /auth/register
async fn handle_register<B>(req: Request<B>, state: &AppState) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let bytes = read_body(body).await?;
    let credentials: CredentialsRequest = decode_body(&parts.headers, &bytes)?;

    let users = state.users.clone();
    let user = run_blocking(move || {
        create_account(users.as_ref(), &credentials.username, &credentials.password)
    })
    .await?;

    info!("Registered user {}", user.id);

    Ok(json_response(
        StatusCode::CREATED,
        &json!({ "id": user.id, "username": user.username }),
    ))
}

/// POST /auth/login
async fn handle_login<B>(req: Request<B>, state: &AppState) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let bytes = read_body(body).await?;
    let credentials: CredentialsRequest = decode_body(&parts.headers, &bytes)?;

    let users = state.users.clone();
    let tokens = state.tokens.clone();
    let issued = run_blocking(move || {
        check_login(
            users.as_ref(),
            tokens.as_ref(),
            &credentials.username,
            &credentials.password,
        )
    })
    .await?;

    debug!("Issued token for user {}", issued.user_id());

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "access_token": issued.token(),
            "token_type": "bearer",
            "expires_in": issued.expires_in(),
        }),
    ))
}

/// GET /
fn handle_current_user(headers: &HeaderMap, state: &AppState) -> Result<Response<ResponseBody>, ApiError> {
    let identity = authenticate(headers, state)?;
    Ok(json_response(StatusCode::OK, &json!({ "user": identity })))
}

/// POST /notes/save
async fn handle_save_note<B>(req: Request<B>, state: &AppState) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let identity = authenticate(&parts.headers, state)?;

    let bytes = read_body(body).await?;
    let request: NoteRequest = decode_body(&parts.headers, &bytes)?;
    let title = NoteTitle::new(&request.title)?;

    let note = state.notes.save(identity.id, &title, &request.content)?;

    Ok(json_response(
        StatusCode::CREATED,
        &json!({
            "note_id": note.id,
            "title": note.title,
            "content": note.content,
        }),
    ))
}

/// GET /notes
fn handle_list_notes(headers: &HeaderMap, state: &AppState) -> Result<Response<ResponseBody>, ApiError> {
    let identity = authenticate(headers, state)?;

    let notes: Vec<_> = state
        .notes
        .list_for_owner(identity.id)?
        .into_iter()
        .map(|note| json!({ "id": note.id, "title": note.title, "content": note.content }))
        .collect();

    Ok(json_response(StatusCode::OK, &serde_json::Value::Array(notes)))
}

/// DELETE /notes/delete/{selector}
fn handle_delete_note(
    headers: &HeaderMap,
    raw_selector: &str,
    state: &AppState,
) -> Result<Response<ResponseBody>, ApiError> {
    let identity = authenticate(headers, state)?;

    let decoded = urlencoding::decode(raw_selector)
        .map_err(|_| NotekeepError::validation("selector", "not valid UTF-8"))?;
    let selector = NoteSelector::parse(&decoded)?;

    state.notes.delete(identity.id, &selector)?;
    Ok(empty_response(StatusCode::NO_CONTENT))
}

/// Resolve the caller from the `Authorization` header
fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Identity, ApiError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    state.resolver().resolve(authorization).map_err(|err| {
        if matches!(err, NotekeepError::Unauthorized) {
            warn!("Rejected request with missing or invalid bearer token");
        }
        ApiError::from(err)
    })
}

/// Run CPU-heavy work (password hashing) off the async workers
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> notekeep_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| NotekeepError::Internal(format!("worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn read_body<B>(body: B) -> Result<Bytes, ApiError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => Err(ApiError::PayloadTooLarge),
        Err(err) => Err(ApiError::BadRequest(err.to_string())),
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Decode a form-urlencoded or JSON body, by content type
fn decode_body<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Result<T, ApiError> {
    if is_form(headers) {
        serde_urlencoded::from_bytes(body).map_err(|e| ApiError::BadRequest(e.to_string()))
    } else {
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_decode_json_credentials() {
        let parsed: CredentialsRequest = decode_body(
            &headers("application/json"),
            br#"{"username":"alice","password":"pw1"}"#,
        )
        .unwrap();
        assert_eq!(parsed.username, "alice");
        assert_eq!(parsed.password, "pw1");
    }

    #[test]
    fn test_decode_form_credentials() {
        let parsed: CredentialsRequest = decode_body(
            &headers("application/x-www-form-urlencoded; charset=utf-8"),
            b"username=alice&password=p%26w",
        )
        .unwrap();
        assert_eq!(parsed.username, "alice");
        assert_eq!(parsed.password, "p&w");
    }

    #[test]
    fn test_decode_note_content_defaults_empty() {
        let parsed: NoteRequest = decode_body(&HeaderMap::new(), br#"{"title":"t"}"#).unwrap();
        assert_eq!(parsed.title, "t");
        assert_eq!(parsed.content, "");
    }

    #[test]
    fn test_decode_malformed_is_bad_request() {
        let err = decode_body::<NoteRequest>(&HeaderMap::new(), b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = decode_body::<CredentialsRequest>(&HeaderMap::new(), br#"{"username":"a"}"#).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_known_paths() {
        assert!(is_known_path("/notes"));
        assert!(is_known_path("/notes/delete/3"));
        assert!(!is_known_path("/notes/other"));
    }
}
