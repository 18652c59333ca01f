// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::company::{Company, CreateCompanyPayload},
};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(companies)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(company)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(exists)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // Os agregados nascem zerados; só o recálculo escreve neles
    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateCompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                name, industry, location, description,
                website, founded, employees, revenue
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.industry)
        .bind(&payload.location)
        .bind(&payload.description)
        .bind(&payload.website)
        .bind(&payload.founded)
        .bind(&payload.employees)
        .bind(&payload.revenue)
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    /// Recalcula média e contagem a partir de `reviews` num único UPDATE atômico.
    /// ROUND(numeric) do Postgres arredonda o meio para longe do zero (meio para cima).
    pub async fn recalculate_rating<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies c
            SET average_rating = stats.average_rating,
                review_count = stats.review_count,
                updated_at = NOW()
            FROM (
                SELECT
                    COALESCE(ROUND(AVG(rating), 1), 0) AS average_rating,
                    COUNT(*)::INT AS review_count
                FROM reviews
                WHERE company_id = $1
            ) AS stats
            WHERE c.id = $1
            RETURNING c.*
            "#,
        )
        .bind(company_id)
        .fetch_optional(executor)
        .await?;

        Ok(company)
    }
}
