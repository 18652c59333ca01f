// src/handlers/reviews.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, MaybeUser},
        i18n::Locale,
    },
    models::{
        envelope::{DataResponse, MessageResponse},
        review::{
            CreateReviewPayload, Review, ReviewContent, ReviewListQuery, ReviewPage, ReviewStats,
            VoteOutcome, VotePayload,
        },
    },
};

// =============================================================================
//  LEITURA (pública; com token, cada avaliação traz o "userVote")
// =============================================================================

// GET /api/reviews/company/{company_id}
#[utoipa::path(
    get,
    path = "/api/reviews/company/{company_id}",
    tag = "Reviews",
    params(
        ("company_id" = Uuid, Path, description = "ID da empresa"),
        ReviewListQuery
    ),
    responses(
        (status = 200, description = "Avaliações paginadas", body = ReviewPage),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn list_company_reviews(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(viewer): MaybeUser,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state.review_service
        .list_company_reviews(company_id, &query, viewer.map(|u| u.id))
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// GET /api/reviews/user/{user_id}
#[utoipa::path(
    get,
    path = "/api/reviews/user/{user_id}",
    tag = "Reviews",
    params(
        ("user_id" = Uuid, Path, description = "ID do autor"),
        ReviewListQuery
    ),
    responses(
        (status = 200, description = "Avaliações do usuário, mais recentes primeiro", body = ReviewPage)
    )
)]
pub async fn list_user_reviews(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(viewer): MaybeUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state.review_service
        .list_user_reviews(user_id, &query, viewer.map(|u| u.id))
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// GET /api/reviews/company/{company_id}/stats
#[utoipa::path(
    get,
    path = "/api/reviews/company/{company_id}/stats",
    tag = "Reviews",
    params(("company_id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Média, total, distribuição e taxa de recomendação", body = DataResponse<ReviewStats>),
        (status = 404, description = "Empresa não encontrada")
    )
)]
pub async fn get_company_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(company_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state.review_service
        .get_stats(company_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(DataResponse::new(stats))))
}

// =============================================================================
//  ESCRITA (autenticada)
// =============================================================================

// POST /api/reviews
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    request_body = CreateReviewPayload,
    responses(
        (status = 201, description = "Avaliação criada", body = DataResponse<Review>),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Empresa não encontrada"),
        (status = 409, description = "Usuário já avaliou esta empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_review(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let content = payload.content.normalized();

    content.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let review = app_state.review_service
        .create_review(&user, payload.company_id, &content)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "message.review_created");
    Ok((StatusCode::CREATED, Json(DataResponse::with_message(message, review))))
}

// PUT /api/reviews/{id}
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID da avaliação")),
    request_body = ReviewContent,
    responses(
        (status = 200, description = "Avaliação atualizada", body = DataResponse<Review>),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas o autor pode editar"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_review(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewContent>,
) -> Result<impl IntoResponse, ApiError> {
    let content = payload.normalized();

    content.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let review = app_state.review_service
        .update_review(id, &user, &content)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "message.review_updated");
    Ok((StatusCode::OK, Json(DataResponse::with_message(message, review))))
}

// DELETE /api/reviews/{id}
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID da avaliação")),
    responses(
        (status = 200, description = "Avaliação excluída", body = MessageResponse),
        (status = 403, description = "Apenas o autor ou um admin"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_review(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.review_service
        .delete_review(id, &user)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "message.review_deleted");
    Ok((StatusCode::OK, Json(MessageResponse { message })))
}

// POST /api/reviews/{id}/vote
#[utoipa::path(
    post,
    path = "/api/reviews/{id}/vote",
    tag = "Reviews",
    params(("id" = Uuid, Path, description = "ID da avaliação")),
    request_body = VotePayload,
    responses(
        (status = 200, description = "Voto registrado (mesmo voto duas vezes desfaz)", body = DataResponse<VoteOutcome>),
        (status = 400, description = "Voto diferente de helpful/unhelpful"),
        (status = 403, description = "Autor não pode votar na própria avaliação"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn vote_review(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state.review_service
        .vote(id, &user, payload.vote.as_deref())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state.i18n_store.translate(&locale.0, "message.vote_recorded");
    Ok((StatusCode::OK, Json(DataResponse::with_message(message, outcome))))
}
