use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use utoipa::ToSchema;

use super::models::{
    LetterRequest, ListModelsRequest, ListModelsResponse, TestConnectionRequest,
    TestConnectionResponse,
};
use super::DraftingError;
use crate::{AppState, ErrorResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct RewriteResponse {
    /// Drafted letter body, plain text with no markup.
    pub text: String,
}

fn error_response(err: &DraftingError) -> HttpResponse {
    let body = ErrorResponse::new(err.kind(), &err.to_string());
    match err {
        DraftingError::MalformedRequest(_) | DraftingError::CredentialMissing { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        DraftingError::BackendFailure { .. } => HttpResponse::InternalServerError().json(body),
    }
}

#[utoipa::path(
    post,
    path = "/api/rewrite",
    tag = "Drafting",
    request_body = LetterRequest,
    responses(
        (
            status = 200,
            description = "Letter body drafted (or the canned letter when no key is configured)",
            body = RewriteResponse
        ),
        (status = 400, description = "Missing or invalid model name", body = ErrorResponse),
        (status = 500, description = "Backend call failed", body = ErrorResponse)
    )
)]
pub async fn rewrite_letter(
    state: web::Data<AppState>,
    body: web::Json<LetterRequest>,
) -> impl Responder {
    match state.service.draft(&body, &state.config.credentials).await {
        Ok(draft) => {
            log::info!(
                "Drafted {} characters{}",
                draft.text.chars().count(),
                if draft.simulated { " (simulated)" } else { "" }
            );
            HttpResponse::Ok().json(RewriteResponse { text: draft.text })
        }
        Err(e) => {
            log::error!("Rewrite failed: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/test-connection",
    tag = "Drafting",
    request_body = TestConnectionRequest,
    responses(
        (status = 200, description = "Backend answered", body = TestConnectionResponse),
        (
            status = 400,
            description = "Missing model name or API key",
            body = TestConnectionResponse
        ),
        (status = 500, description = "Backend rejected the call", body = TestConnectionResponse)
    )
)]
pub async fn test_connection(
    state: web::Data<AppState>,
    body: web::Json<TestConnectionRequest>,
) -> impl Responder {
    let (response, failure) = state
        .service
        .test_connection(&body, &state.config.credentials)
        .await;

    match failure {
        None => HttpResponse::Ok().json(response),
        Some(DraftingError::BackendFailure { .. }) => {
            HttpResponse::InternalServerError().json(response)
        }
        Some(_) => HttpResponse::BadRequest().json(response),
    }
}

#[utoipa::path(
    post,
    path = "/api/check-models",
    tag = "Drafting",
    request_body = ListModelsRequest,
    responses(
        (
            status = 200,
            description = "Models usable for text generation",
            body = ListModelsResponse
        ),
        (
            status = 400,
            description = "No key available, or the provider's own error payload",
            body = ErrorResponse
        ),
        (status = 500, description = "Provider unreachable", body = ErrorResponse)
    )
)]
pub async fn check_models(
    state: web::Data<AppState>,
    body: web::Json<ListModelsRequest>,
) -> impl Responder {
    match state
        .service
        .list_models(body.api_key.as_deref(), &state.config.credentials)
        .await
    {
        Ok(models) => HttpResponse::Ok().json(models),
        Err(DraftingError::BackendFailure {
            upstream: Some(payload),
            ..
        }) => {
            log::warn!("Model listing rejected upstream");
            HttpResponse::BadRequest().json(payload)
        }
        Err(e) => {
            log::error!("Model listing failed: {}", e);
            error_response(&e)
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/rewrite").route(web::post().to(rewrite_letter)))
        .service(web::resource("/test-connection").route(web::post().to(test_connection)))
        .service(web::resource("/check-models").route(web::post().to(check_models)));
}
