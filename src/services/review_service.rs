// src/services/review_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, ReviewRepository},
    models::{
        auth::User,
        review::{
            Pagination, Review, ReviewContent, ReviewListQuery, ReviewPage, ReviewStats,
            VoteEntry, VoteKind, VoteOutcome,
        },
    },
    services::vote_ledger::{apply_vote, LedgerChange, VoteCounters},
};

#[derive(Clone)]
pub struct ReviewService {
    review_repo: ReviewRepository,
    company_repo: CompanyRepository,
    pool: PgPool,
}

impl ReviewService {
    pub fn new(review_repo: ReviewRepository, company_repo: CompanyRepository, pool: PgPool) -> Self {
        Self { review_repo, company_repo, pool }
    }

    // =========================================================================
    //  1. AGREGADOS DA EMPRESA
    // =========================================================================

    /// Recalcula média/contagem da empresa. Falhas são apenas logadas.
    pub async fn recalculate_company_rating(&self, company_id: Uuid) {
        match self.company_repo.recalculate_rating(&self.pool, company_id).await {
            Ok(Some(company)) => {
                tracing::debug!(
                    "📊 Agregado da empresa {} recalculado: média {} em {} avaliações",
                    company_id,
                    company.average_rating,
                    company.review_count
                );
            }
            Ok(None) => {
                tracing::warn!("Empresa {} sumiu antes do recálculo do agregado", company_id);
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Falha ao recalcular agregado da empresa {}: {:?}",
                    company_id,
                    e
                );
            }
        }
    }

    // =========================================================================
    //  2. CRIAR / EDITAR / EXCLUIR
    // =========================================================================

    pub async fn create_review(
        &self,
        author: &User,
        company_id: Uuid,
        content: &ReviewContent,
    ) -> Result<Review, AppError> {
        if !self.company_repo.exists(&self.pool, company_id).await? {
            return Err(AppError::CompanyNotFound);
        }

        if self.review_repo
            .exists_for_user_company(&self.pool, author.id, company_id)
            .await?
        {
            return Err(AppError::ReviewAlreadyExists);
        }

        // O índice único (user_id, company_id) ainda cobre a corrida entre a checagem e o INSERT
        let review_id = self.review_repo
            .create(&self.pool, author.id, company_id, content)
            .await?;

        tracing::info!("📝 Avaliação {} criada por {} para a empresa {}", review_id, author.id, company_id);

        self.recalculate_company_rating(company_id).await;

        self.load_review(review_id, Some(author.id)).await
    }

    // Recalcula também na edição: a nota pode ter mudado
    pub async fn update_review(
        &self,
        review_id: Uuid,
        actor: &User,
        content: &ReviewContent,
    ) -> Result<Review, AppError> {
        let owner = self.review_repo
            .find_owner(&self.pool, review_id)
            .await?
            .ok_or(AppError::ReviewNotFound)?;

        if owner.user_id != actor.id {
            return Err(AppError::NotReviewAuthor);
        }

        let updated = self.review_repo
            .update_content(&self.pool, review_id, content)
            .await?;
        if !updated {
            return Err(AppError::ReviewNotFound);
        }

        self.recalculate_company_rating(owner.company_id).await;

        self.load_review(review_id, Some(actor.id)).await
    }

    pub async fn delete_review(&self, review_id: Uuid, actor: &User) -> Result<(), AppError> {
        let owner = self.review_repo
            .find_owner(&self.pool, review_id)
            .await?
            .ok_or(AppError::ReviewNotFound)?;

        if owner.user_id != actor.id && !actor.is_admin() {
            return Err(AppError::DeleteForbidden);
        }

        let company_id = self.review_repo
            .delete(&self.pool, review_id)
            .await?
            .ok_or(AppError::ReviewNotFound)?;

        tracing::info!("🗑️ Avaliação {} excluída por {}", review_id, actor.id);

        self.recalculate_company_rating(company_id).await;
        Ok(())
    }

    // =========================================================================
    //  3. LIVRO DE VOTOS
    // =========================================================================

    pub async fn vote(
        &self,
        review_id: Uuid,
        voter: &User,
        raw_vote: Option<&str>,
    ) -> Result<VoteOutcome, AppError> {
        let incoming = raw_vote
            .and_then(VoteKind::parse)
            .ok_or_else(|| AppError::InvalidVote(raw_vote.unwrap_or_default().to_string()))?;

        // Uma transação só: trava a avaliação, lê o livro, grava livro + contadores
        let mut tx = self.pool.begin().await?;

        let target = self.review_repo
            .lock_vote_target(&mut *tx, review_id)
            .await?
            .ok_or(AppError::ReviewNotFound)?;

        if target.user_id == voter.id {
            return Err(AppError::CannotVoteOwnReview);
        }

        let existing = self.review_repo
            .find_vote(&mut *tx, review_id, voter.id)
            .await?;

        let transition = apply_vote(
            VoteCounters::new(target.helpful_votes, target.unhelpful_votes),
            existing,
            incoming,
        );

        match transition.change {
            LedgerChange::Insert(vote) => {
                self.review_repo.insert_vote(&mut *tx, review_id, voter.id, vote).await?;
            }
            LedgerChange::Switch(vote) => {
                self.review_repo.switch_vote(&mut *tx, review_id, voter.id, vote).await?;
            }
            LedgerChange::Remove => {
                self.review_repo.delete_vote(&mut *tx, review_id, voter.id).await?;
            }
        }

        self.review_repo
            .update_vote_counters(
                &mut *tx,
                review_id,
                transition.counters.helpful,
                transition.counters.unhelpful,
            )
            .await?;

        tx.commit().await?;

        Ok(VoteOutcome {
            helpful_votes: transition.counters.helpful,
            unhelpful_votes: transition.counters.unhelpful,
            user_vote: transition.user_vote,
        })
    }

    // =========================================================================
    //  4. CONSULTAS
    // =========================================================================

    pub async fn list_company_reviews(
        &self,
        company_id: Uuid,
        query: &ReviewListQuery,
        viewer: Option<Uuid>,
    ) -> Result<ReviewPage, AppError> {
        if !self.company_repo.exists(&self.pool, company_id).await? {
            return Err(AppError::CompanyNotFound);
        }

        let (page, limit) = (query.page(), query.limit());

        let reviews = self.review_repo
            .list_by_company(company_id, query.sort(), limit, query.offset())
            .await?;
        let total = self.review_repo.count_by_company(company_id).await?;

        Ok(ReviewPage {
            data: self.with_votes(reviews, viewer).await?,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn list_user_reviews(
        &self,
        user_id: Uuid,
        query: &ReviewListQuery,
        viewer: Option<Uuid>,
    ) -> Result<ReviewPage, AppError> {
        let (page, limit) = (query.page(), query.limit());

        let reviews = self.review_repo
            .list_by_user(user_id, limit, query.offset())
            .await?;
        let total = self.review_repo.count_by_user(user_id).await?;

        Ok(ReviewPage {
            data: self.with_votes(reviews, viewer).await?,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn get_stats(&self, company_id: Uuid) -> Result<ReviewStats, AppError> {
        if !self.company_repo.exists(&self.pool, company_id).await? {
            return Err(AppError::CompanyNotFound);
        }

        let samples = self.review_repo.rating_samples(company_id).await?;
        Ok(ReviewStats::from_samples(&samples))
    }

    async fn load_review(&self, review_id: Uuid, viewer: Option<Uuid>) -> Result<Review, AppError> {
        let review = self.review_repo
            .find_by_id(&self.pool, review_id)
            .await?
            .ok_or(AppError::ReviewNotFound)?;

        let mut reviews = self.with_votes(vec![review], viewer).await?;
        reviews.pop().ok_or(AppError::ReviewNotFound)
    }

    // Carrega o livro de votos de todas as avaliações numa consulta só
    async fn with_votes(
        &self,
        mut reviews: Vec<Review>,
        viewer: Option<Uuid>,
    ) -> Result<Vec<Review>, AppError> {
        let ids: Vec<Uuid> = reviews.iter().map(|r| r.id).collect();
        let rows = self.review_repo.votes_for_reviews(&ids).await?;

        let mut ledger: HashMap<Uuid, Vec<VoteEntry>> = HashMap::new();
        for row in rows {
            ledger
                .entry(row.review_id)
                .or_default()
                .push(VoteEntry { user: row.user_id, vote: row.vote });
        }

        for review in &mut reviews {
            let entries = ledger.remove(&review.id).unwrap_or_default();
            review.attach_votes(entries, viewer);
        }

        Ok(reviews)
    }
}

// Estes testes precisam de DATABASE_URL: o #[sqlx::test] cria um banco
// descartável por teste e aplica `migrations/`.
#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::{
        db::UserRepository,
        models::{auth::RegisterUserPayload, company::Company},
        services::company_service::demo_companies,
    };

    fn service(pool: &PgPool) -> ReviewService {
        ReviewService::new(
            ReviewRepository::new(pool.clone()),
            CompanyRepository::new(pool.clone()),
            pool.clone(),
        )
    }

    async fn new_user(pool: &PgPool, username: &str) -> User {
        let payload = RegisterUserPayload {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secret1".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        };
        UserRepository::new(pool.clone())
            .create_user(pool, &payload, "hash")
            .await
            .unwrap()
    }

    async fn new_company(pool: &PgPool) -> Company {
        let payload = demo_companies().remove(0);
        CompanyRepository::new(pool.clone())
            .create(pool, &payload)
            .await
            .unwrap()
    }

    async fn reload_company(pool: &PgPool, id: Uuid) -> Company {
        CompanyRepository::new(pool.clone())
            .find_by_id(pool, id)
            .await
            .unwrap()
            .unwrap()
    }

    fn content(rating: &str) -> ReviewContent {
        ReviewContent {
            rating: rating.parse().unwrap(),
            title: "Review".into(),
            comment: "Some words".into(),
            pros: None,
            cons: None,
            work_environment: None,
            work_life_balance: None,
            salary: None,
            is_recommended: true,
            position: None,
            employment_type: None,
            experience_length: None,
        }
    }

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[sqlx::test]
    async fn aggregate_follows_creates_and_deletes(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;
        assert_eq!((company.average_rating, company.review_count), (Decimal::ZERO, 0));

        let mut created = Vec::new();
        for (name, rating) in [("ana", "5"), ("bia", "4"), ("caio", "3")] {
            let author = new_user(&pool, name).await;
            let review = svc.create_review(&author, company.id, &content(rating)).await.unwrap();
            created.push((author, review));
        }

        let company_now = reload_company(&pool, company.id).await;
        assert_eq!(company_now.average_rating, d("4.0"));
        assert_eq!(company_now.review_count, 3);

        let (author, review) = &created[2];
        svc.delete_review(review.id, author).await.unwrap();

        let company_now = reload_company(&pool, company.id).await;
        assert_eq!(company_now.average_rating, d("4.5"));
        assert_eq!(company_now.review_count, 2);
    }

    #[sqlx::test]
    async fn rating_edit_recomputes_with_half_up_rounding(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;
        let ana = new_user(&pool, "ana").await;
        let bia = new_user(&pool, "bia").await;

        svc.create_review(&ana, company.id, &content("5")).await.unwrap();
        let review = svc.create_review(&bia, company.id, &content("4")).await.unwrap();
        assert_eq!(reload_company(&pool, company.id).await.average_rating, d("4.5"));

        // (5 + 3.5) / 2 = 4.25 -> 4.3
        let updated = svc.update_review(review.id, &bia, &content("3.5")).await.unwrap();
        assert_eq!(updated.rating, d("3.5"));

        let company_now = reload_company(&pool, company.id).await;
        assert_eq!(company_now.average_rating, d("4.3"));
        assert_eq!(company_now.review_count, 2);
    }

    #[sqlx::test]
    async fn second_review_for_same_company_conflicts(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;
        let ana = new_user(&pool, "ana").await;

        svc.create_review(&ana, company.id, &content("4")).await.unwrap();
        let err = svc.create_review(&ana, company.id, &content("2")).await.unwrap_err();

        assert!(matches!(err, AppError::ReviewAlreadyExists), "{:?}", err);
        assert_eq!(reload_company(&pool, company.id).await.review_count, 1);
    }

    #[sqlx::test]
    async fn only_author_or_admin_may_change_a_review(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;
        let ana = new_user(&pool, "ana").await;
        let bia = new_user(&pool, "bia").await;

        let review = svc.create_review(&ana, company.id, &content("4")).await.unwrap();

        let err = svc.update_review(review.id, &bia, &content("1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotReviewAuthor), "{:?}", err);

        let err = svc.delete_review(review.id, &bia).await.unwrap_err();
        assert!(matches!(err, AppError::DeleteForbidden), "{:?}", err);

        let err = svc.delete_review(Uuid::new_v4(), &ana).await.unwrap_err();
        assert!(matches!(err, AppError::ReviewNotFound), "{:?}", err);
    }

    #[sqlx::test]
    async fn author_cannot_vote_on_own_review(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;
        let ana = new_user(&pool, "ana").await;

        let review = svc.create_review(&ana, company.id, &content("4")).await.unwrap();
        let err = svc.vote(review.id, &ana, Some("helpful")).await.unwrap_err();

        assert!(matches!(err, AppError::CannotVoteOwnReview), "{:?}", err);
    }

    #[sqlx::test]
    async fn vote_sequence_updates_counters_and_ledger(pool: PgPool) {
        let svc = service(&pool);
        let repo = ReviewRepository::new(pool.clone());
        let company = new_company(&pool).await;
        let ana = new_user(&pool, "ana").await;
        let bia = new_user(&pool, "bia").await;

        let review = svc.create_review(&ana, company.id, &content("4")).await.unwrap();

        let outcome = svc.vote(review.id, &bia, Some("helpful")).await.unwrap();
        assert_eq!(
            (outcome.helpful_votes, outcome.unhelpful_votes, outcome.user_vote),
            (1, 0, Some(VoteKind::Helpful))
        );
        assert_eq!(repo.find_vote(&pool, review.id, bia.id).await.unwrap(), Some(VoteKind::Helpful));

        // Mesmo voto de novo desfaz
        let outcome = svc.vote(review.id, &bia, Some("helpful")).await.unwrap();
        assert_eq!(
            (outcome.helpful_votes, outcome.unhelpful_votes, outcome.user_vote),
            (0, 0, None)
        );
        assert_eq!(repo.find_vote(&pool, review.id, bia.id).await.unwrap(), None);

        let outcome = svc.vote(review.id, &bia, Some("unhelpful")).await.unwrap();
        assert_eq!(
            (outcome.helpful_votes, outcome.unhelpful_votes, outcome.user_vote),
            (0, 1, Some(VoteKind::Unhelpful))
        );
        assert_eq!(repo.find_vote(&pool, review.id, bia.id).await.unwrap(), Some(VoteKind::Unhelpful));

        // Troca de lado
        let outcome = svc.vote(review.id, &bia, Some("helpful")).await.unwrap();
        assert_eq!(
            (outcome.helpful_votes, outcome.unhelpful_votes, outcome.user_vote),
            (1, 0, Some(VoteKind::Helpful))
        );

        // Contadores persistidos e livro anexado na leitura
        let stored = svc.load_review(review.id, Some(bia.id)).await.unwrap();
        assert_eq!((stored.helpful_votes, stored.unhelpful_votes), (1, 0));
        assert_eq!(stored.user_vote, Some(VoteKind::Helpful));
        assert_eq!(stored.voted_users, vec![VoteEntry { user: bia.id, vote: VoteKind::Helpful }]);
    }

    #[sqlx::test]
    async fn missing_or_unknown_vote_is_rejected(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;
        let ana = new_user(&pool, "ana").await;
        let bia = new_user(&pool, "bia").await;

        let review = svc.create_review(&ana, company.id, &content("4")).await.unwrap();

        for raw in [None, Some("meh")] {
            let err = svc.vote(review.id, &bia, raw).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidVote(_)), "{:?}", err);
        }
    }

    #[sqlx::test]
    async fn stats_for_company_without_reviews_are_zeroed(pool: PgPool) {
        let svc = service(&pool);
        let company = new_company(&pool).await;

        let stats = svc.get_stats(company.id).await.unwrap();
        assert_eq!(stats, ReviewStats::empty());

        let err = svc.get_stats(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::CompanyNotFound), "{:?}", err);
    }
}
