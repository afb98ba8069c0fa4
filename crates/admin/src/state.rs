//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{config::AdminConfig, services::EmailService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    email: Option<EmailService>,
}

impl AppState {
    /// Create the shared application state.
    ///
    /// `email` is `None` when SMTP is not configured; gift card delivery
    /// emails are skipped in that case.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool, email: Option<EmailService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
