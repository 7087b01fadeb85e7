//! Business logic services for the application layer.

pub mod auth_service;
pub mod code_resolver;
pub mod shortener_service;
pub mod token_service;

pub use auth_service::{AuthService, AuthSession};
pub use code_resolver::CodeResolver;
pub use shortener_service::ShortenerService;
pub use token_service::TokenService;
