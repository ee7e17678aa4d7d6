use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use vcard_core::{Card, CardId, CardSecret, CardStatus, filter_by_status};

use crate::domain::{ApiError, ApiRequest, ResponseKind};
use crate::infrastructure::dto::{CardDto, StatusDto};

use super::session::Session;

const CARDS_PATH: &str = "/cards/v1/cards";
const RENAME_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct SecretDto {
    pan: String,
    cvv: String,
}

/// Secret tagged with the session generation it was fetched under
struct CachedSecret {
    generation: u64,
    secret: CardSecret,
}

/// Card listing and per-card operations
///
/// Revealed secrets stay in memory only, keyed by card id, and are dropped
/// as soon as the session they were fetched under ends.
pub struct CardService {
    session: Arc<Session>,
    vas_alias: String,
    secrets: DashMap<CardId, CachedSecret>,
}

impl CardService {
    pub fn new(session: Arc<Session>, vas_alias: impl Into<String>) -> Self {
        CardService {
            session,
            vas_alias: vas_alias.into(),
            secrets: DashMap::new(),
        }
    }

    /// Cards of the current person, optionally narrowed to one status
    pub async fn list_cards(&self, status: Option<CardStatus>) -> Result<Vec<Card>, ApiError> {
        let request = ApiRequest::get(CARDS_PATH).query("vas-alias", self.vas_alias.as_str());
        match self.session.fetch::<Vec<CardDto>>(request).await {
            Ok(cards) => {
                let cards: Vec<Card> = cards.into_iter().map(Card::from).collect();
                tracing::debug!(count = cards.len(), "fetched cards");
                Ok(filter_by_status(cards, status))
            }
            Err(err) => {
                self.session.report(&err);
                Err(err)
            }
        }
    }

    /// Block a card; sent whatever the card's current status is
    pub async fn block(&self, card: &Card) -> Result<(), ApiError> {
        let result = self.toggle_block(card.id, "block").await;
        let notifier = self.session.notifier();
        match &result {
            Ok(()) => notifier.success("The card was blocked"),
            Err(_) => notifier.error("Failed to block the card"),
        }
        result
    }

    pub async fn unblock(&self, card: &Card) -> Result<(), ApiError> {
        let result = self.toggle_block(card.id, "unblock").await;
        let notifier = self.session.notifier();
        match &result {
            Ok(()) => notifier.success("The card was unblocked"),
            Err(_) => notifier.error("Failed to unblock the card"),
        }
        result
    }

    async fn toggle_block(&self, card_id: CardId, action: &str) -> Result<(), ApiError> {
        let person_id = self.session.require_person_id()?;
        let path = format!("/cards/v2/persons/{}/cards/{}/{}", person_id, card_id, action);
        // only the HTTP status matters, the body is not decoded
        let request = ApiRequest::put(path).expect(ResponseKind::Bytes);
        self.session.send(request).await?;
        tracing::info!(card_id, action, "card status change requested");
        Ok(())
    }

    /// Fetch the full number and CVV of a card
    ///
    /// Every call uses a fresh operation id and replaces the cached secret
    /// for this card only.
    pub async fn reveal_secret(&self, card: &Card) -> Result<CardSecret, ApiError> {
        let generation = self.session.generation();
        let request = ApiRequest::put(format!("{}/{}/details", CARDS_PATH, card.id))
            .json(json!({ "operationId": Uuid::new_v4().to_string() }));

        match self.session.fetch::<SecretDto>(request).await {
            Ok(dto) => {
                let secret = CardSecret::new(dto.pan, dto.cvv);
                // a token switch while the call was in flight makes the result stale
                if self.session.generation() == generation {
                    self.secrets.insert(
                        card.id,
                        CachedSecret {
                            generation,
                            secret: secret.clone(),
                        },
                    );
                }
                Ok(secret)
            }
            Err(err) => {
                self.session.report(&err);
                Err(err)
            }
        }
    }

    /// Set the user-visible card name; true only when the provider confirms
    pub async fn rename(&self, card: &Card, alias: &str) -> bool {
        let request = ApiRequest::put(format!("{}/{}/alias", CARDS_PATH, card.id))
            .json(json!({ "alias": alias }));

        let renamed = match self.session.fetch::<StatusDto>(request).await {
            Ok(resp) => resp.status == RENAME_OK,
            Err(err) => {
                tracing::warn!(card_id = card.id, error = %err, "rename failed");
                false
            }
        };

        let notifier = self.session.notifier();
        if renamed {
            notifier.success(&format!("Card {} was renamed", card.masked_number));
        } else {
            notifier.error(&format!("Failed to rename card {}", card.masked_number));
        }
        renamed
    }

    /// Secret revealed earlier in the current session
    pub fn cached_secret(&self, card_id: CardId) -> Option<CardSecret> {
        let generation = self.session.generation();
        let stale = match self.secrets.get(&card_id) {
            Some(entry) if entry.generation == generation => return Some(entry.secret.clone()),
            Some(_) => true,
            None => false,
        };
        if stale {
            self.secrets.remove(&card_id);
        }
        None
    }

    pub fn forget_secret(&self, card_id: CardId) {
        self.secrets.remove(&card_id);
    }

    pub fn forget_all_secrets(&self) {
        self.secrets.clear();
    }
}
