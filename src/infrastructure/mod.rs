//! Infrastructure layer - token signing, user storage, and observability

pub mod auth;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod user;
