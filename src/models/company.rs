// src/models/company.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// average_rating e review_count são derivados: só o recálculo de avaliações escreve neles.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "TechCorp")]
    pub name: String,
    #[schema(example = "Technology")]
    pub industry: String,
    #[schema(example = "San Francisco, CA")]
    pub location: String,
    pub description: String,
    pub website: Option<String>,
    pub founded: Option<String>,
    pub employees: Option<String>,
    pub revenue: Option<String>,

    #[schema(value_type = f64, example = 4.5)]
    pub average_rating: Decimal,
    pub review_count: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "TechCorp")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Technology")]
    pub industry: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "San Francisco, CA")]
    pub location: String,

    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    #[validate(url(message = "url"))]
    #[schema(example = "https://techcorp.com")]
    pub website: Option<String>,

    #[schema(example = "2010")]
    pub founded: Option<String>,

    #[schema(example = "500-1000")]
    pub employees: Option<String>,

    #[schema(example = "$100M+")]
    pub revenue: Option<String>,
}

impl CreateCompanyPayload {
    pub fn normalized(self) -> Self {
        fn trim_opt(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            name: self.name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            website: trim_opt(self.website),
            founded: trim_opt(self.founded),
            employees: trim_opt(self.employees),
            revenue: trim_opt(self.revenue),
        }
    }
}
