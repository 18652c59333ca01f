// src/models/review.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ---
// Enums (espelham os tipos do Postgres)
// ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "aspect_grade", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AspectGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "employment_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,   // "full-time"
    PartTime,   // "part-time"
    Contract,
    Internship,
    Freelance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "experience_length")]
pub enum ExperienceLength {
    #[sqlx(rename = "less-than-1-year")]
    #[serde(rename = "less-than-1-year")]
    LessThanOneYear,
    #[sqlx(rename = "1-2-years")]
    #[serde(rename = "1-2-years")]
    OneToTwoYears,
    #[sqlx(rename = "3-5-years")]
    #[serde(rename = "3-5-years")]
    ThreeToFiveYears,
    #[sqlx(rename = "5-10-years")]
    #[serde(rename = "5-10-years")]
    FiveToTenYears,
    #[sqlx(rename = "more-than-10-years")]
    #[serde(rename = "more-than-10-years")]
    MoreThanTenYears,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "vote_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Helpful,
    Unhelpful,
}

impl VoteKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "helpful" => Some(VoteKind::Helpful),
            "unhelpful" => Some(VoteKind::Unhelpful),
            _ => None,
        }
    }
}

// ---
// Avaliação (leitura, já com autor e empresa)
// ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    #[sqlx(rename = "author_id")]
    pub id: Uuid,
    #[sqlx(rename = "author_username")]
    pub username: String,
    #[sqlx(rename = "author_first_name")]
    pub first_name: String,
    #[sqlx(rename = "author_last_name")]
    pub last_name: String,
}

// Uma entrada do livro de votos
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct VoteEntry {
    pub user: Uuid,
    pub vote: VoteKind,
}

// Linha de `review_votes` usada na carga em lote
#[derive(Debug, Clone, FromRow)]
pub struct VoteRow {
    pub review_id: Uuid,
    pub user_id: Uuid,
    pub vote: VoteKind,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,

    #[sqlx(flatten)]
    #[serde(rename = "user")]
    pub author: ReviewAuthor,

    pub company_id: Uuid,
    pub company_name: String,

    #[schema(value_type = f64, example = 4.5)]
    pub rating: Decimal,
    pub title: String,
    pub comment: String,
    pub pros: Option<String>,
    pub cons: Option<String>,
    pub work_environment: Option<AspectGrade>,
    pub work_life_balance: Option<AspectGrade>,
    pub salary: Option<AspectGrade>,
    pub is_recommended: bool,
    pub position: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub experience_length: Option<ExperienceLength>,
    pub is_verified: bool,

    pub helpful_votes: i32,
    pub unhelpful_votes: i32,

    #[sqlx(skip)]
    pub voted_users: Vec<VoteEntry>,
    #[sqlx(skip)]
    pub total_votes: i32,
    #[sqlx(skip)]
    pub helpfulness_ratio: f64,
    // Voto de quem está consultando (null se anônimo ou sem voto)
    #[sqlx(skip)]
    pub user_vote: Option<VoteKind>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Anexa o livro de votos e preenche os campos calculados.
    pub fn attach_votes(&mut self, entries: Vec<VoteEntry>, viewer: Option<Uuid>) {
        self.user_vote = viewer.and_then(|viewer_id| {
            entries.iter().find(|e| e.user == viewer_id).map(|e| e.vote)
        });
        self.voted_users = entries;
        self.total_votes = self.helpful_votes + self.unhelpful_votes;
        self.helpfulness_ratio = if self.total_votes > 0 {
            f64::from(self.helpful_votes) / f64::from(self.total_votes)
        } else {
            0.0
        };
    }
}

// Dono e empresa de uma avaliação (checagem de permissão)
#[derive(Debug, Clone, FromRow)]
pub struct ReviewOwner {
    pub user_id: Uuid,
    pub company_id: Uuid,
}

// Avaliação travada (FOR UPDATE) para o voto
#[derive(Debug, Clone, FromRow)]
pub struct VoteTarget {
    pub user_id: Uuid,
    pub helpful_votes: i32,
    pub unhelpful_votes: i32,
}

// ---
// Payloads
// ---

fn validate_rating(rating: &Decimal) -> Result<(), ValidationError> {
    if *rating < Decimal::ONE || *rating > Decimal::from(5) {
        let mut err = ValidationError::new("range");
        err.message = Some("rating_range".into());
        return Err(err);
    }
    // Apenas inteiros ou meio ponto (4.5)
    if !(*rating * Decimal::TWO).fract().is_zero() {
        let mut err = ValidationError::new("step");
        err.message = Some("rating_step".into());
        return Err(err);
    }
    Ok(())
}

// Campos de conteúdo: os únicos que o autor pode escrever
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewContent {
    #[validate(custom(function = "validate_rating"))]
    #[schema(value_type = f64, example = 4.5)]
    pub rating: Decimal,

    #[validate(length(min = 1, max = 100, message = "title_length"))]
    #[schema(example = "Great place to grow")]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "comment_length"))]
    pub comment: String,

    #[validate(length(max = 500, message = "text_500"))]
    pub pros: Option<String>,

    #[validate(length(max = 500, message = "text_500"))]
    pub cons: Option<String>,

    pub work_environment: Option<AspectGrade>,
    pub work_life_balance: Option<AspectGrade>,
    pub salary: Option<AspectGrade>,

    pub is_recommended: bool,

    #[validate(length(max = 100, message = "text_100"))]
    #[schema(example = "Backend Engineer")]
    pub position: Option<String>,

    pub employment_type: Option<EmploymentType>,
    pub experience_length: Option<ExperienceLength>,
}

impl ReviewContent {
    pub fn normalized(self) -> Self {
        fn trim_opt(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            title: self.title.trim().to_string(),
            comment: self.comment.trim().to_string(),
            pros: trim_opt(self.pros),
            cons: trim_opt(self.cons),
            position: trim_opt(self.position),
            ..self
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
    // O frontend envia "company"
    #[serde(alias = "company")]
    pub company_id: Uuid,

    #[serde(flatten)]
    pub content: ReviewContent,
}

// Ausente ou nulo é tratado como voto inválido
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VotePayload {
    #[serde(default)]
    #[schema(example = "helpful")]
    pub vote: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub helpful_votes: i32,
    pub unhelpful_votes: i32,
    pub user_vote: Option<VoteKind>,
}

// ---
// Listagem paginada
// ---

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSort {
    Newest,
    Oldest,
    RatingDesc,
    RatingAsc,
    Helpful,
}

impl ReviewSort {
    // Valor desconhecido cai no padrão (mais recentes)
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("oldest") => ReviewSort::Oldest,
            Some("rating-desc") => ReviewSort::RatingDesc,
            Some("rating-asc") => ReviewSort::RatingAsc,
            Some("helpful") => ReviewSort::Helpful,
            _ => ReviewSort::Newest,
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            ReviewSort::Newest => "r.created_at DESC",
            ReviewSort::Oldest => "r.created_at ASC",
            ReviewSort::RatingDesc => "r.rating DESC, r.created_at DESC",
            ReviewSort::RatingAsc => "r.rating ASC, r.created_at DESC",
            ReviewSort::Helpful => "r.helpful_votes DESC, r.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// Página (começa em 1)
    pub page: Option<i64>,
    /// Itens por página (máx. 100)
    pub limit: Option<i64>,
    /// newest | oldest | rating-desc | rating-asc | helpful
    pub sort: Option<String>,
}

impl ReviewListQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn sort(&self) -> ReviewSort {
        ReviewSort::parse(self.sort.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: i64,
    /// Total de páginas
    pub total: i64,
    pub limit: i64,
    pub total_reviews: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total_reviews: i64) -> Self {
        Self {
            current: page,
            total: (total_reviews + limit - 1) / limit,
            limit,
            total_reviews,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewPage {
    pub data: Vec<Review>,
    pub pagination: Pagination,
}

// ---
// Estatísticas
// ---

// Amostra mínima para as estatísticas de uma empresa
#[derive(Debug, Clone, FromRow)]
pub struct RatingSample {
    pub rating: Decimal,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    #[schema(value_type = f64, example = 4.5)]
    pub average_rating: Decimal,
    pub total_reviews: i64,
    /// Sempre com as chaves 1..=5
    pub rating_distribution: BTreeMap<u8, i64>,
    /// Percentual (0-100)
    pub recommendation_rate: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(rating: Decimal) -> ReviewContent {
        ReviewContent {
            rating,
            title: "Good".into(),
            comment: "Nice team".into(),
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

    #[test]
    fn rating_accepts_whole_and_half_points() {
        for r in ["1", "1.5", "3", "4.5", "5"] {
            assert!(content(r.parse().unwrap()).validate().is_ok(), "{}", r);
        }
    }

    #[test]
    fn rating_rejects_out_of_range_and_off_step_values() {
        for r in ["0.5", "5.5", "0", "4.3", "2.25"] {
            let errors = content(r.parse().unwrap()).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("rating"), "{}", r);
        }
    }

    #[test]
    fn text_limits_are_enforced() {
        let mut c = content(Decimal::from(4));
        c.title = "t".repeat(101);
        c.pros = Some("p".repeat(501));
        c.position = Some("x".repeat(101));

        let errors = c.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("pros"));
        assert!(fields.contains_key("position"));
    }

    #[test]
    fn create_payload_accepts_company_alias_and_enum_values() {
        let id = Uuid::new_v4();
        let payload: CreateReviewPayload = serde_json::from_value(json!({
            "company": id,
            "rating": 4.5,
            "title": "Solid",
            "comment": "Good place",
            "isRecommended": true,
            "workLifeBalance": "good",
            "employmentType": "full-time",
            "experienceLength": "1-2-years"
        }))
        .unwrap();

        assert_eq!(payload.company_id, id);
        assert_eq!(payload.content.rating, Decimal::new(45, 1));
        assert_eq!(payload.content.work_life_balance, Some(AspectGrade::Good));
        assert_eq!(payload.content.employment_type, Some(EmploymentType::FullTime));
        assert_eq!(payload.content.experience_length, Some(ExperienceLength::OneToTwoYears));
    }

    #[test]
    fn normalization_drops_blank_optional_text() {
        let mut c = content(Decimal::from(3));
        c.title = "  Title  ".into();
        c.cons = Some("   ".into());

        let c = c.normalized();
        assert_eq!(c.title, "Title");
        assert_eq!(c.cons, None);
    }

    fn review_with_votes(helpful: i32, unhelpful: i32) -> Review {
        let now = Utc::now();
        Review {
            id: Uuid::new_v4(),
            author: ReviewAuthor {
                id: Uuid::new_v4(),
                username: "jdoe".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
            },
            company_id: Uuid::new_v4(),
            company_name: "Acme".into(),
            rating: Decimal::from(4),
            title: "Good".into(),
            comment: "Nice team".into(),
            pros: None,
            cons: None,
            work_environment: None,
            work_life_balance: None,
            salary: None,
            is_recommended: true,
            position: None,
            employment_type: None,
            experience_length: None,
            is_verified: false,
            helpful_votes: helpful,
            unhelpful_votes: unhelpful,
            voted_users: Vec::new(),
            total_votes: 0,
            helpfulness_ratio: 0.0,
            user_vote: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn attach_votes_fills_derived_fields_and_viewer_vote() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut review = review_with_votes(3, 1);

        review.attach_votes(
            vec![
                VoteEntry { user: other, vote: VoteKind::Helpful },
                VoteEntry { user: viewer, vote: VoteKind::Unhelpful },
            ],
            Some(viewer),
        );

        assert_eq!(review.total_votes, 4);
        assert!((review.helpfulness_ratio - 0.75).abs() < f64::EPSILON);
        assert_eq!(review.user_vote, Some(VoteKind::Unhelpful));
        assert_eq!(review.voted_users.len(), 2);

        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["user"]["username"], json!("jdoe"));
        assert_eq!(value["userVote"], json!("unhelpful"));
        assert_eq!(value["rating"], json!(4.0));
    }

    #[test]
    fn attach_votes_without_votes_or_viewer() {
        let mut review = review_with_votes(0, 0);
        review.attach_votes(Vec::new(), None);

        assert_eq!(review.total_votes, 0);
        assert_eq!(review.helpfulness_ratio, 0.0);
        assert_eq!(review.user_vote, None);
        assert_eq!(serde_json::to_value(&review).unwrap()["userVote"], json!(null));
    }

    #[test]
    fn vote_kind_parsing() {
        assert_eq!(VoteKind::parse("helpful"), Some(VoteKind::Helpful));
        assert_eq!(VoteKind::parse("unhelpful"), Some(VoteKind::Unhelpful));
        assert_eq!(VoteKind::parse("Helpful"), None);
    }

    #[test]
    fn vote_payload_tolerates_missing_or_null_vote() {
        let missing: VotePayload = serde_json::from_value(json!({})).unwrap();
        let null: VotePayload = serde_json::from_value(json!({ "vote": null })).unwrap();
        let given: VotePayload = serde_json::from_value(json!({ "vote": "helpful" })).unwrap();

        assert_eq!(missing.vote, None);
        assert_eq!(null.vote, None);
        assert_eq!(given.vote.as_deref(), Some("helpful"));
    }

    #[test]
    fn list_query_defaults_and_clamping() {
        let q = ReviewListQuery::default();
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 10, 0));
        assert_eq!(q.sort(), ReviewSort::Newest);

        let q = ReviewListQuery { page: Some(3), limit: Some(500), sort: Some("helpful".into()) };
        assert_eq!((q.page(), q.limit(), q.offset()), (3, 100, 200));
        assert_eq!(q.sort(), ReviewSort::Helpful);

        let q = ReviewListQuery { page: Some(0), limit: Some(-4), sort: Some("bogus".into()) };
        assert_eq!((q.page(), q.limit()), (1, 10));
        assert_eq!(q.sort(), ReviewSort::Newest);

        let q = ReviewListQuery { page: Some(i64::MAX), limit: Some(10), sort: None };
        assert_eq!(q.offset(), i64::MAX);
    }

    #[test]
    fn pagination_rounds_page_count_up() {
        assert_eq!(Pagination::new(1, 10, 0).total, 0);
        assert_eq!(Pagination::new(1, 10, 10).total, 1);
        assert_eq!(Pagination::new(2, 10, 11).total, 2);
    }

    #[test]
    fn stats_distribution_serializes_with_string_keys() {
        let stats = ReviewStats {
            average_rating: Decimal::new(45, 1),
            total_reviews: 2,
            rating_distribution: (1..=5).map(|k| (k, if k >= 4 { 1 } else { 0 })).collect(),
            recommendation_rate: 50,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["averageRating"], json!(4.5));
        assert_eq!(value["ratingDistribution"]["4"], json!(1));
        assert_eq!(value["ratingDistribution"]["1"], json!(0));
        assert_eq!(value["recommendationRate"], json!(50));
    }
}
