use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod config;
pub mod error;
pub mod handlers {
    pub mod contact_handlers;
    pub mod map_handlers;
    pub mod member_session;
    pub mod profile_handlers;
    pub mod words_handlers;
}
pub mod models {
    pub mod geo_models;
    pub mod profile_models;
    pub mod words_models;
}
pub mod repositories {
    pub mod profile_repository;
}
pub mod utils {
    pub mod avatar;
    pub mod geocoding;
    pub mod location_lookup;
    pub mod profile_editor;
    pub mod validation;
    pub mod words_feed;
}

use config::AppConfig;
use error::AppError;
use handlers::{contact_handlers, map_handlers, profile_handlers, words_handlers};
use repositories::profile_repository::{ProfileRepository, RepositoryError};
use utils::geocoding::{GeocodeError, LocationResolver};
use utils::location_lookup::LocationLookup;
use utils::profile_editor::ProfileEditor;
use utils::words_feed::WordsFeed;

pub struct AppState {
    pub config: AppConfig,
    pub profile_repository: Arc<dyn ProfileRepository>,
    pub resolver: Arc<LocationResolver>,
    pub words: WordsFeed,
    editors: DashMap<String, Arc<Mutex<ProfileEditor>>>,
    lookups: DashMap<String, Arc<Mutex<LocationLookup>>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        profile_repository: Arc<dyn ProfileRepository>,
    ) -> Result<Self, GeocodeError> {
        let resolver = Arc::new(LocationResolver::new(config.geocoder.clone())?);
        Ok(Self {
            config,
            profile_repository,
            resolver,
            words: WordsFeed::with_demo_entries(),
            editors: DashMap::new(),
            lookups: DashMap::new(),
        })
    }

    /// Editor for the member, loaded from the repository on first use.
    pub fn editor_for(&self, member_id: &str) -> Result<Arc<Mutex<ProfileEditor>>, AppError> {
        if let Some(editor) = self.editors.get(member_id) {
            return Ok(editor.clone());
        }
        let profile = self
            .profile_repository
            .get(member_id)?
            .ok_or_else(|| RepositoryError::NotFound(member_id.to_string()))?;
        tracing::debug!(member_id = member_id, "Opened profile editor session");
        let editor = self
            .editors
            .entry(member_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ProfileEditor::new(profile))))
            .clone();
        Ok(editor)
    }

    /// Map lookup session for the member. Only members known to the
    /// repository get one, so the map stays bounded by the member count.
    pub fn lookup_for(&self, member_id: &str) -> Result<Arc<Mutex<LocationLookup>>, AppError> {
        if let Some(lookup) = self.lookups.get(member_id) {
            return Ok(lookup.clone());
        }
        self.ensure_member(member_id)?;
        let lookup = self
            .lookups
            .entry(member_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(LocationLookup::new(self.config.tile_layer.clone())))
            })
            .clone();
        Ok(lookup)
    }

    /// Fails with `NotFound` unless the member exists.
    pub fn ensure_member(&self, member_id: &str) -> Result<(), AppError> {
        if self.editors.contains_key(member_id) {
            return Ok(());
        }
        match self.profile_repository.get(member_id)? {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound(member_id.to_string()).into()),
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn router(state: Arc<AppState>) -> Router {
    let avatar_limit = state.config.avatar_max_bytes + 64 * 1024;

    let profile_routes = Router::new()
        .route("/api/profile", get(profile_handlers::get_profile))
        .route("/api/profile/form", get(profile_handlers::get_profile_form))
        .route("/api/profile/tab", post(profile_handlers::switch_tab))
        .route("/api/profile/edit", post(profile_handlers::start_edit))
        .route("/api/profile/field", patch(profile_handlers::update_field))
        .route(
            "/api/profile/avatar",
            post(profile_handlers::upload_avatar).layer(DefaultBodyLimit::max(avatar_limit)),
        )
        .route("/api/profile/submit", post(profile_handlers::submit_profile))
        .route(
            "/api/profile/account/submit",
            post(profile_handlers::submit_account),
        )
        .route("/api/profile/cancel", post(profile_handlers::cancel_edit))
        .route("/api/profile/map-link", get(profile_handlers::get_map_link));

    let map_routes = Router::new()
        .route("/api/map", get(map_handlers::get_map))
        .route(
            "/api/map/location",
            put(map_handlers::set_lookup_location),
        )
        .route("/api/map/state", get(map_handlers::get_lookup_state));

    let words_routes = Router::new()
        .route("/api/words", get(words_handlers::list_words))
        .route("/api/words/{id}", get(words_handlers::get_words_entry))
        .route("/api/words/{id}/like", post(words_handlers::toggle_like));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/contact", post(contact_handlers::submit_contact));

    let cors = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_origin(AllowOrigin::exact(origin))
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::ORIGIN,
                header::HeaderName::from_static(handlers::member_session::MEMBER_HEADER),
            ])
            .allow_credentials(true),
        Err(e) => {
            tracing::warn!("Invalid FRONTEND_URL, cross-origin requests disabled: {}", e);
            CorsLayer::new()
        }
    };

    Router::new()
        .merge(public_routes)
        .merge(profile_routes)
        .merge(map_routes)
        .merge(words_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
