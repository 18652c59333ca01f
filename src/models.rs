pub mod auth;
pub mod company;
pub mod envelope;
pub mod review;
