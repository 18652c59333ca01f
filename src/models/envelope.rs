// src/models/envelope.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::auth::User;

// Envelope padrão das respostas: { "message"?: ..., "data": ... }
#[derive(Debug, Serialize, ToSchema)]
pub struct DataResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { message: None, data }
    }

    pub fn with_message(message: String, data: T) -> Self {
        Self { message: Some(message), data }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
