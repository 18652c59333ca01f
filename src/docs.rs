// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health_check,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::create_company,

        // --- Reviews ---
        handlers::reviews::list_company_reviews,
        handlers::reviews::get_company_stats,
        handlers::reviews::list_user_reviews,
        handlers::reviews::create_review,
        handlers::reviews::update_review,
        handlers::reviews::delete_review,
        handlers::reviews::vote_review,
    ),
    components(
        schemas(
            // --- Envelope ---
            models::envelope::MessageResponse,
            models::envelope::MeResponse,
            models::envelope::HealthResponse,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Companies ---
            models::company::Company,
            models::company::CreateCompanyPayload,

            // --- Reviews ---
            models::review::AspectGrade,
            models::review::EmploymentType,
            models::review::ExperienceLength,
            models::review::VoteKind,
            models::review::ReviewAuthor,
            models::review::VoteEntry,
            models::review::Review,
            models::review::ReviewContent,
            models::review::CreateReviewPayload,
            models::review::VotePayload,
            models::review::VoteOutcome,
            models::review::Pagination,
            models::review::ReviewPage,
            models::review::ReviewStats,
        )
    ),
    tags(
        (name = "Health", description = "Estado do servidor"),
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Companies", description = "Empresas avaliadas"),
        (name = "Reviews", description = "Avaliações, votos de utilidade e estatísticas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
