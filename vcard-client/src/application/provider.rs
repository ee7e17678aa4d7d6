use std::sync::Arc;
use vcard_core::ProfileInfo;

use crate::config::{ClientConfigFile, ConfigError};
use crate::domain::{ApiError, KeyValueStore, Notifier, RequestExecutor};
use crate::infrastructure::RestClient;

use super::cards::CardService;
use super::history::HistoryService;
use super::orders::OrderService;
use super::session::Session;

/// Entry point bundling the session with every service built on it
pub struct Provider {
    session: Arc<Session>,
    cards: CardService,
    orders: OrderService,
    history: HistoryService,
}

impl Provider {
    pub fn new(
        config: &ClientConfigFile,
        executor: Arc<dyn RequestExecutor>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = Arc::new(Session::new(executor, store, notifier));
        Provider {
            cards: CardService::new(session.clone(), config.provider.card_vas_alias.clone()),
            orders: OrderService::new(session.clone(), config.payments.clone()),
            history: HistoryService::new(session.clone()),
            session,
        }
    }

    /// Provider talking HTTP to the configured base URL
    pub fn from_config(
        config: &ClientConfigFile,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        let client = RestClient::from_config(&config.provider)?;
        tracing::debug!(base_url = %client.base_url(), "provider client ready");
        Ok(Self::new(config, Arc::new(client), store, notifier))
    }

    /// Verify `token` and make it the active session
    pub async fn login(&self, token: &str) -> Result<ProfileInfo, ApiError> {
        let result = self.session.verify(token).await;
        self.cards.forget_all_secrets();
        result
    }

    /// Restore the persisted session and check it is still valid
    pub async fn restore(&self) -> Result<ProfileInfo, ApiError> {
        if !self.session.load_persisted() {
            return Err(ApiError::AuthInvalid);
        }
        self.session.resume().await
    }

    pub fn logout(&self) {
        self.session.clear();
        self.cards.forget_all_secrets();
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn cards(&self) -> &CardService {
        &self.cards
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }
}
