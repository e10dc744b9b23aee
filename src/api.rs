use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use log::{trace, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::clients::UserDirectory;
use crate::context::RequestContext;
use crate::error::ServiceError;
use crate::protocol::{CreateVersionRequest, ErrorCode};
use crate::types::Caller;
use crate::versions::VersionService;

const USERNAME_HEADER: &str = "x-username";

#[derive(Clone)]
pub struct ApiState {
    pub versions: Arc<VersionService>,
    pub users: Arc<dyn UserDirectory>,
}

pub fn app(state: ApiState) -> Router {
    let versions_router = Router::new()
        .route(
            "/api/documents/:document_id/versions",
            post(create_version).get(list_versions),
        )
        .route(
            "/api/documents/:document_id/versions/:version_id",
            get(get_version_content).delete(delete_version),
        )
        .route(
            "/api/documents/:document_id/versions/:version_id/restore",
            post(restore_version),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state);

    Router::new()
        .route("/api/health", get(health))
        .merge(versions_router)
}

async fn health() -> &'static str {
    "ok"
}

// Caller auth middleware

fn get_header_value(req: &Request, header: &str) -> Option<String> {
    let header_value = req.headers().get(header)?;
    if let Ok(str) = header_value.to_str() {
        Some(str.to_string())
    } else {
        None
    }
}

async fn authenticate(
    State(state): State<ApiState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(username) = get_header_value(&req, USERNAME_HEADER)
        .filter(|name| !name.trim().is_empty())
    else {
        return service_err_response(ServiceError::auth_failed(
            "Missing caller identity",
        ));
    };

    let ctx = RequestContext::new(req.headers().get(header::AUTHORIZATION).cloned());
    match state.users.find_by_username(&ctx, &username).await {
        Ok(Some(user)) => {
            trace!("api: authenticated {} as {}", username, user.id);
            req.extensions_mut().insert(Caller {
                id: user.id,
                username: user.username,
            });
            next.run(req).await
        }
        Ok(None) => {
            service_err_response(ServiceError::auth_failed("Unknown user"))
        }
        Err(err) => {
            warn!("api: couldn't resolve user {}: {}", username, err);
            service_err_response(ServiceError::auth_failed(
                "Couldn't resolve user",
            ))
        }
    }
}

// Api response helpers

#[derive(Serialize)]
struct ServiceErrorBody {
    error: ServiceError,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        ErrorCode::AuthFailed => StatusCode::UNAUTHORIZED,
        ErrorCode::AccessDenied => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidState => StatusCode::CONFLICT,
        ErrorCode::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn service_err_response(error: ServiceError) -> Response {
    let status = status_for(error.code);
    let body = Json(ServiceErrorBody { error });
    (status, body).into_response()
}

fn service_response<T>(result: Result<T, ServiceError>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(res) => Json(res).into_response(),
        Err(err) => service_err_response(err),
    }
}

fn no_content_response(result: Result<(), ServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => service_err_response(err),
    }
}

fn bad_path(rejection: PathRejection) -> Response {
    service_err_response(ServiceError::bad_request(&rejection.body_text()))
}

fn parse_create_request(body: &Bytes) -> Result<CreateVersionRequest, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateVersionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ServiceError::bad_request(&err.to_string()))
}

// Version handlers

async fn create_version(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    ctx: RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> Response {
    let Path(document_id) = match path {
        Ok(path) => path,
        Err(rejection) => return bad_path(rejection),
    };
    let payload = match parse_create_request(&body) {
        Ok(payload) => payload,
        Err(err) => return service_err_response(err),
    };
    let res = state
        .versions
        .create_version(&ctx, document_id, caller.id, payload.label)
        .await;
    match res {
        Ok(info) => (StatusCode::CREATED, Json(info)).into_response(),
        Err(err) => service_err_response(err),
    }
}

async fn list_versions(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    ctx: RequestContext,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let Path(document_id) = match path {
        Ok(path) => path,
        Err(rejection) => return bad_path(rejection),
    };
    let res = state
        .versions
        .list_versions(&ctx, document_id, caller.id)
        .await;
    service_response(res)
}

async fn get_version_content(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    ctx: RequestContext,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Response {
    let Path((document_id, version_id)) = match path {
        Ok(path) => path,
        Err(rejection) => return bad_path(rejection),
    };
    let res = state
        .versions
        .get_version_content(&ctx, document_id, caller.id, version_id)
        .await;
    match res {
        Ok(content) => (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )],
            content,
        )
            .into_response(),
        Err(err) => service_err_response(err),
    }
}

async fn restore_version(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    ctx: RequestContext,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Response {
    let Path((document_id, version_id)) = match path {
        Ok(path) => path,
        Err(rejection) => return bad_path(rejection),
    };
    let res = state
        .versions
        .restore_version(&ctx, document_id, caller.id, version_id)
        .await;
    no_content_response(res)
}

async fn delete_version(
    State(state): State<ApiState>,
    Extension(caller): Extension<Caller>,
    ctx: RequestContext,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Response {
    let Path((document_id, version_id)) = match path {
        Ok(path) => path,
        Err(rejection) => return bad_path(rejection),
    };
    let res = state
        .versions
        .delete_version(&ctx, document_id, caller.id, version_id)
        .await;
    no_content_response(res)
}
