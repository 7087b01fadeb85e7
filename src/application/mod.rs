//! Application layer services implementing business logic.
//!
//! Services consume repository traits and give HTTP handlers a narrow API.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Shortening, resolution and owner-scoped management
//! - [`services::code_resolver::CodeResolver`] - Unused short code lookup
//! - [`services::auth_service::AuthService`] - Registration, login and token authentication
//! - [`services::token_service::TokenService`] - JWT issuing and validation

pub mod services;
