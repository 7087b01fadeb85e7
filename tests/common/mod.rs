#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::connect_info::MockConnectInfo;
use axum::routing::get;
use axum::{Router, middleware};
use axum_test::TestServer;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use linkshort::api;
use linkshort::api::handlers::{health_handler, redirect_handler};
use linkshort::api::middleware::auth;
use linkshort::domain::access_event::AccessEvent;
use linkshort::domain::entities::{NewShortenedUrl, NewUser};
use linkshort::domain::repositories::{UrlRepository, UserRepository};
use linkshort::infrastructure::cache::{
    CacheEntry, CacheError, CacheResult, CacheService, CachedLink, NullCache,
};
use linkshort::prelude::*;
use linkshort::utils::code_generator::RandomCodeGenerator;

pub const BASE_URL: &str = "http://localhost:3000";
pub const PEER_IP: [u8; 4] = [203, 0, 113, 7];

/// `UrlRepository` over a `Vec`, mirroring the PostgreSQL semantics.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    rows: Mutex<Vec<ShortenedUrl>>,
}

impl InMemoryUrlRepository {
    pub fn all(&self) -> Vec<ShortenedUrl> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn find_live_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| !u.is_deleted() && u.is_owned_by(owner_id) && u.original_url == original_url)
            .cloned())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().any(|u| u.short_code == code))
    }

    async fn try_create(
        &self,
        new_url: NewShortenedUrl,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.short_code == new_url.short_code) {
            return Ok(None);
        }

        let now = Utc::now();
        let url = ShortenedUrl {
            id: rows.len() as i64 + 1,
            original_url: new_url.original_url,
            short_code: new_url.short_code,
            owner_id: new_url.owner_id,
            click_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(url.clone());
        Ok(Some(url))
    }

    async fn find_live_by_code(&self, code: &str) -> Result<Option<ShortenedUrl>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| !u.is_deleted() && u.short_code == code)
            .cloned())
    }

    async fn list_live_by_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortenedUrl>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|u| !u.is_deleted() && u.is_owned_by(owner_id))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_live_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|u| !u.is_deleted() && u.is_owned_by(owner_id))
            .count() as i64)
    }

    async fn update_original_url(
        &self,
        id: i64,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortenedUrl>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(url) = rows
            .iter_mut()
            .find(|u| u.id == id && !u.is_deleted() && u.is_owned_by(owner_id))
        else {
            return Ok(None);
        };

        url.original_url = original_url.to_string();
        url.updated_at = Utc::now();
        Ok(Some(url.clone()))
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<Option<ShortenedUrl>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(url) = rows
            .iter_mut()
            .find(|u| u.id == id && !u.is_deleted() && u.is_owned_by(owner_id))
        else {
            return Ok(None);
        };

        url.deleted_at = Some(Utc::now());
        Ok(Some(url.clone()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_email_key" }),
            ));
        }

        let user = User {
            id: users.len() as i64 + 1,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().unwrap().clone())
    }
}

/// `CacheService` over a `HashMap` with the Redis write semantics.
///
/// `set_failing(true)` makes every call return an error, as a broken backend
/// would.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    failing: AtomicBool,
}

impl InMemoryCache {
    pub fn entry(&self, short_code: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(short_code).cloned()
    }

    pub fn insert(&self, short_code: &str, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(short_code.to_string(), entry);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::Operation("cache unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<CacheEntry>> {
        self.check()?;
        Ok(self.entry(short_code))
    }

    async fn fill_link(&self, short_code: &str, link: &CachedLink) -> CacheResult<bool> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(short_code) {
            return Ok(false);
        }
        entries.insert(short_code.to_string(), CacheEntry::Live(link.clone()));
        Ok(true)
    }

    async fn set_link(&self, short_code: &str, link: &CachedLink) -> CacheResult<()> {
        self.check()?;
        self.insert(short_code, CacheEntry::Live(link.clone()));
        Ok(())
    }

    async fn mark_gone(&self, short_code: &str) -> CacheResult<()> {
        self.check()?;
        self.insert(short_code, CacheEntry::Gone);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.check().is_ok()
    }
}

/// Everything a handler test needs to drive and inspect the app.
pub struct TestContext {
    pub state: AppState,
    pub urls: Arc<InMemoryUrlRepository>,
    pub access_rx: mpsc::Receiver<AccessEvent>,
}

pub fn create_test_state() -> TestContext {
    create_test_state_with_cache(Arc::new(NullCache::new()))
}

pub fn create_test_state_with_cache(cache: Arc<dyn CacheService>) -> TestContext {
    let urls = Arc::new(InMemoryUrlRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let (tx, rx) = mpsc::channel(100);

    let url_repository: Arc<dyn UrlRepository> = urls.clone();
    let user_repository: Arc<dyn UserRepository> = users;

    let shortener_service = ShortenerService::new(
        url_repository,
        Arc::new(RandomCodeGenerator::seeded(42)),
        BASE_URL.to_string(),
    );
    let auth_service = AuthService::new(user_repository, TokenService::new("test-secret", 24));

    let state = AppState {
        shortener_service: Arc::new(shortener_service),
        auth_service: Arc::new(auth_service),
        cache,
        access_sender: tx,
        behind_proxy: false,
    };

    TestContext {
        state,
        urls,
        access_rx: rx,
    }
}

/// Application routes without rate limiting, with a fixed peer address.
pub fn create_test_app(state: AppState) -> Router {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api::routes::public_routes().merge(protected))
        .with_state(state)
        .layer(MockConnectInfo(SocketAddr::from((PEER_IP, 41000))))
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(create_test_app(state)).unwrap()
}

/// Registers a user and returns their access token.
pub async fn register_user(state: &AppState, email: &str) -> String {
    state
        .auth_service
        .register(email, "correct-horse-battery")
        .await
        .unwrap()
        .token
}
