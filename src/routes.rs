// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn create_router(app_state: AppState) -> Router {
    // Rotas de autenticação: register/login públicas, /me protegida
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route(
            "/me",
            get(handlers::auth::get_me).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        );

    // Listagem pública; cadastro exige token (e papel admin, checado no handler)
    let company_routes = Router::new()
        .route(
            "/",
            get(handlers::companies::list_companies).merge(
                post(handlers::companies::create_company).layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
            ),
        )
        .route("/{id}", get(handlers::companies::get_company));

    let public_review_routes = Router::new()
        .route("/company/{company_id}", get(handlers::reviews::list_company_reviews))
        .route("/company/{company_id}/stats", get(handlers::reviews::get_company_stats))
        .route("/user/{user_id}", get(handlers::reviews::list_user_reviews));

    let protected_review_routes = Router::new()
        .route("/", post(handlers::reviews::create_review))
        .route(
            "/{id}",
            put(handlers::reviews::update_review)
                .delete(handlers::reviews::delete_review),
        )
        .route("/{id}/vote", post(handlers::reviews::vote_review))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/companies", company_routes)
        .nest("/api/reviews", public_review_routes.merge(protected_review_routes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
