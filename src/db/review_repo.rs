// src/db/review_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::review::{
        RatingSample, Review, ReviewContent, ReviewOwner, ReviewSort, VoteKind, VoteRow,
        VoteTarget,
    },
};

// Avaliação + autor + nome da empresa (o "populate" das listagens)
const REVIEW_SELECT: &str = r#"
    SELECT
        r.id, r.company_id, c.name AS company_name,
        u.id AS author_id, u.username AS author_username,
        u.first_name AS author_first_name, u.last_name AS author_last_name,
        r.rating, r.title, r.comment, r.pros, r.cons,
        r.work_environment, r.work_life_balance, r.salary,
        r.is_recommended, r.position, r.employment_type, r.experience_length,
        r.is_verified, r.helpful_votes, r.unhelpful_votes,
        r.created_at, r.updated_at
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    JOIN companies c ON c.id = r.company_id
"#;

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Review>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let review = sqlx::query_as::<_, Review>(&format!("{} WHERE r.id = $1", REVIEW_SELECT))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(review)
    }

    pub async fn find_owner<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ReviewOwner>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let owner = sqlx::query_as::<_, ReviewOwner>(
            "SELECT user_id, company_id FROM reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(owner)
    }

    pub async fn exists_for_user_company<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND company_id = $2)",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn list_by_company(
        &self,
        company_id: Uuid,
        sort: ReviewSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError> {
        // order_by() só devolve literais estáticos, nada vindo do cliente
        let sql = format!(
            "{} WHERE r.company_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            REVIEW_SELECT,
            sort.order_by()
        );

        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(company_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    pub async fn count_by_company(&self, company_id: Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, AppError> {
        let sql = format!(
            "{} WHERE r.user_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            REVIEW_SELECT,
            ReviewSort::Newest.order_by()
        );

        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(reviews)
    }

    pub async fn count_by_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    pub async fn rating_samples(&self, company_id: Uuid) -> Result<Vec<RatingSample>, AppError> {
        let samples = sqlx::query_as::<_, RatingSample>(
            "SELECT rating, is_recommended FROM reviews WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }

    // =========================================================================
    //  ESCRITA (conteúdo)
    // =========================================================================

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        company_id: Uuid,
        content: &ReviewContent,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (
                user_id, company_id, rating, title, comment, pros, cons,
                work_environment, work_life_balance, salary, is_recommended,
                position, employment_type, experience_length
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(content.rating)
        .bind(&content.title)
        .bind(&content.comment)
        .bind(&content.pros)
        .bind(&content.cons)
        .bind(content.work_environment)
        .bind(content.work_life_balance)
        .bind(content.salary)
        .bind(content.is_recommended)
        .bind(&content.position)
        .bind(content.employment_type)
        .bind(content.experience_length)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Corrida entre a checagem prévia e o INSERT: o índice único decide
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("reviews_user_company_key")
                {
                    return AppError::ReviewAlreadyExists;
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::CompanyNotFound;
                }
            }
            e.into()
        })?;

        Ok(id)
    }

    pub async fn update_content<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        content: &ReviewContent,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET rating = $2, title = $3, comment = $4, pros = $5, cons = $6,
                work_environment = $7, work_life_balance = $8, salary = $9,
                is_recommended = $10, position = $11, employment_type = $12,
                experience_length = $13, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(content.rating)
        .bind(&content.title)
        .bind(&content.comment)
        .bind(&content.pros)
        .bind(&content.cons)
        .bind(content.work_environment)
        .bind(content.work_life_balance)
        .bind(content.salary)
        .bind(content.is_recommended)
        .bind(&content.position)
        .bind(content.employment_type)
        .bind(content.experience_length)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // Devolve a empresa da avaliação removida (para o recálculo)
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM reviews WHERE id = $1 RETURNING company_id")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(company_id)
    }

    // =========================================================================
    //  LIVRO DE VOTOS
    // =========================================================================

    pub async fn votes_for_reviews(&self, review_ids: &[Uuid]) -> Result<Vec<VoteRow>, AppError> {
        if review_ids.is_empty() {
            return Ok(Vec::new());
        }

        let votes = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT review_id, user_id, vote
            FROM review_votes
            WHERE review_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(review_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes)
    }

    /// Trava a linha da avaliação até o fim da transação (serializa votos concorrentes).
    pub async fn lock_vote_target<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<VoteTarget>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let target = sqlx::query_as::<_, VoteTarget>(
            r#"
            SELECT user_id, helpful_votes, unhelpful_votes
            FROM reviews
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(target)
    }

    pub async fn find_vote<'e, E>(
        &self,
        executor: E,
        review_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<VoteKind>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vote: Option<VoteKind> = sqlx::query_scalar(
            "SELECT vote FROM review_votes WHERE review_id = $1 AND user_id = $2",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(vote)
    }

    pub async fn insert_vote<'e, E>(
        &self,
        executor: E,
        review_id: Uuid,
        user_id: Uuid,
        vote: VoteKind,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO review_votes (review_id, user_id, vote) VALUES ($1, $2, $3)")
            .bind(review_id)
            .bind(user_id)
            .bind(vote)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn switch_vote<'e, E>(
        &self,
        executor: E,
        review_id: Uuid,
        user_id: Uuid,
        vote: VoteKind,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE review_votes
            SET vote = $3, updated_at = NOW()
            WHERE review_id = $1 AND user_id = $2
            "#,
        )
        .bind(review_id)
        .bind(user_id)
        .bind(vote)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn delete_vote<'e, E>(
        &self,
        executor: E,
        review_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM review_votes WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn update_vote_counters<'e, E>(
        &self,
        executor: E,
        review_id: Uuid,
        helpful_votes: i32,
        unhelpful_votes: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE reviews
            SET helpful_votes = $2, unhelpful_votes = $3
            WHERE id = $1
            "#,
        )
        .bind(review_id)
        .bind(helpful_votes)
        .bind(unhelpful_votes)
        .execute(executor)
        .await?;

        Ok(())
    }
}
