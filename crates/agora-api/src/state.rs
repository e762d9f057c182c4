use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;

use agora_db::{Database, DbResult};

use crate::error::{ApiError, ApiResult};
use crate::mailer::Mailer;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Directory served under `/uploads`.
    pub uploads_dir: PathBuf,
    /// Public base URL of this API, used in confirmation links.
    pub api_base: String,
    /// Public URL of the web client, used in password recovery links.
    pub frontend_host: String,
    pub mailer: Arc<dyn Mailer>,
}

/// Runs a blocking database closure off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
