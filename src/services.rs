pub mod auth;
pub mod company_service;
pub mod review_service;
pub mod review_stats;
pub mod vote_ledger;
