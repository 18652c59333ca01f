// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{CompanyRepository, ReviewRepository, UserRepository},
    services::{auth::AuthService, company_service::CompanyService, review_service::ReviewService},
};

// Configuração lida do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub jwt_expiration_days: i64,
    pub database_max_connections: u32,
    pub seed_companies: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:5001".to_string());

        let jwt_expiration_days = env::var("JWT_EXPIRATION_DAYS")
            .ok()
            .map(|v| v.parse::<i64>())
            .transpose()
            .context("JWT_EXPIRATION_DAYS deve ser um número inteiro")?
            .unwrap_or(7);

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS deve ser um número inteiro")?
            .unwrap_or(5);

        let seed_companies = env::var("SEED_COMPANIES")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            jwt_expiration_days,
            database_max_connections,
            seed_companies,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub company_service: CompanyService,
    pub review_service: ReviewService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(config, db_pool)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(config: &Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::load()?;

        let user_repo = UserRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let review_repo = ReviewRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            config.jwt_expiration_days,
            db_pool.clone(),
        );
        let company_service = CompanyService::new(company_repo.clone(), db_pool.clone());
        let review_service = ReviewService::new(review_repo, company_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            i18n_store,
            auth_service,
            company_service,
            review_service,
        })
    }
}
