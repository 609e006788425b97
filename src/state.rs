//! Shared application state: the jurisdiction, the exporter and the session
//! cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::{ConfigError, ServerConfig};
use crate::export::{DocumentRenderer, PadExporter, TypstRenderEngine};
use crate::jurisdiction::Jurisdiction;
use crate::metrics;
use crate::wizard::{WizardError, WizardSession};

pub type SharedSession = Arc<Mutex<WizardSession>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Cache<Uuid, SharedSession>,
    pub jurisdiction: Arc<Jurisdiction>,
    pub exporter: PadExporter,
}

impl AppState {
    pub fn new(
        jurisdiction: Jurisdiction,
        renderer: Arc<dyn DocumentRenderer>,
        session_ttl: Duration,
        max_sessions: u64,
    ) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(session_ttl)
            .max_capacity(max_sessions)
            .build();

        Self {
            sessions,
            jurisdiction: Arc::new(jurisdiction),
            exporter: PadExporter::new(renderer),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let jurisdiction = config.load_jurisdiction()?;
        let renderer = Arc::new(TypstRenderEngine::new(config.typst_bin.clone()));
        Ok(Self::new(
            jurisdiction,
            renderer,
            config.session_ttl,
            config.max_sessions,
        ))
    }

    pub async fn create_session(&self) -> SharedSession {
        let session = WizardSession::new(self.jurisdiction.clone());
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id, shared.clone()).await;
        metrics::SESSIONS_CREATED_TOTAL.inc();
        log::info!("Created session {}", id);
        shared
    }

    pub async fn session(&self, id: Uuid) -> Result<SharedSession, WizardError> {
        self.sessions
            .get(&id)
            .await
            .ok_or(WizardError::SessionNotFound(id))
    }

    pub async fn discard_session(&self, id: Uuid) -> Result<(), WizardError> {
        match self.sessions.remove(&id).await {
            Some(_) => {
                log::info!("Discarded session {}", id);
                Ok(())
            }
            None => Err(WizardError::SessionNotFound(id)),
        }
    }
}
