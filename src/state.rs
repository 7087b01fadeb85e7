//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, ShortenerService};
use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::infrastructure::cache::CacheService;

/// Handler state; cheap to clone.
///
/// Services hold repository trait objects so the same router runs against
/// PostgreSQL in production and in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    pub shortener_service: Arc<ShortenerService<dyn UrlRepository>>,
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub access_sender: mpsc::Sender<AccessEvent>,
    /// Trust X-Forwarded-For / X-Real-IP for client addresses.
    pub behind_proxy: bool,
}
