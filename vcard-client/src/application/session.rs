use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use vcard_core::ProfileInfo;

use crate::domain::{
    ApiError, ApiRequest, KeyValueStore, Notifier, RequestExecutor, ResponseBody,
    TOKEN_EXPIRED_MESSAGE,
};
use crate::infrastructure::dto::ProfileDto;

pub const TOKEN_KEY: &str = "token";
pub const PERSON_ID_KEY: &str = "personId";

const PROFILE_PATH: &str = "/person-profile/v1/profile/current";

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    person_id: Option<u64>,
    profile: Option<ProfileInfo>,
}

/// The single authenticated session of the client
///
/// Owns the bearer token and the identity of the person it belongs to. Every
/// authenticated call goes through [`Session::send`], which refuses to touch
/// the network while no token is set. Each token switch bumps a generation
/// counter so caches keyed on the old identity can tell they are stale.
pub struct Session {
    executor: Arc<dyn RequestExecutor>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<SessionState>,
    generation: AtomicU64,
}

impl Session {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Session {
            executor,
            store,
            notifier,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Restore token and person id from the store
    ///
    /// Returns whether a token was found. The profile itself is not fetched;
    /// call [`Session::resume`] to check the restored token.
    pub fn load_persisted(&self) -> bool {
        let token = self
            .read_key(TOKEN_KEY)
            .filter(|t| !t.trim().is_empty());
        let person_id = self
            .read_key(PERSON_ID_KEY)
            .and_then(|id| id.trim().parse::<u64>().ok());

        let found = token.is_some();
        let mut state = self.state.write();
        state.token = token;
        state.person_id = person_id;
        state.profile = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(found, person_id = ?state.person_id, "restored session");
        found
    }

    /// Check `token` against the provider and make it the active session
    ///
    /// On success the profile and person id are cached and both keys are
    /// persisted. Any failure clears the session and reports the token as
    /// expired.
    pub async fn verify(&self, token: &str) -> Result<ProfileInfo, ApiError> {
        let token = token.trim();
        if token.is_empty() {
            self.reject("empty token");
            return Err(ApiError::AuthInvalid);
        }

        let request = ApiRequest::get(PROFILE_PATH).bearer(token);
        let profile = match self.executor.execute(request).await {
            Ok(body) => body.into_json::<ProfileDto>().map(ProfileInfo::from),
            Err(err) => Err(err),
        };

        match profile {
            Ok(profile) => {
                self.activate(token, profile.clone());
                tracing::info!(person_id = profile.person_id, "session verified");
                Ok(profile)
            }
            Err(err) => {
                self.reject(&err.to_string());
                Err(ApiError::AuthInvalid)
            }
        }
    }

    /// Re-verify the token restored by [`Session::load_persisted`]
    pub async fn resume(&self) -> Result<ProfileInfo, ApiError> {
        match self.token() {
            Some(token) => self.verify(&token).await,
            None => Err(ApiError::AuthInvalid),
        }
    }

    /// Replace the active token without verifying it
    ///
    /// The cached identity is dropped when the token changes.
    pub fn set_token(&self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            self.clear();
            return;
        }

        let changed = {
            let mut state = self.state.write();
            let changed = state.token.as_deref() != Some(token);
            if changed {
                state.token = Some(token.to_string());
                state.person_id = None;
                state.profile = None;
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            changed
        };

        if changed {
            self.write_key(TOKEN_KEY, Some(token));
            self.write_key(PERSON_ID_KEY, None);
        }
    }

    /// Drop the token, identity and persisted keys
    pub fn clear(&self) {
        {
            let mut state = self.state.write();
            *state = SessionState::default();
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        self.write_key(TOKEN_KEY, None);
        self.write_key(PERSON_ID_KEY, None);
        tracing::info!("session cleared");
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn person_id(&self) -> Option<u64> {
        self.state.read().person_id
    }

    pub fn profile(&self) -> Option<ProfileInfo> {
        self.state.read().profile.clone()
    }

    pub fn is_active(&self) -> bool {
        self.state.read().token.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Person id for person-scoped paths
    pub fn require_person_id(&self) -> Result<u64, ApiError> {
        self.person_id().ok_or(ApiError::AuthInvalid)
    }

    /// Send an authenticated request with the current token
    pub async fn send(&self, request: ApiRequest) -> Result<ResponseBody, ApiError> {
        let token = self.token().ok_or(ApiError::AuthInvalid)?;
        self.executor.execute(request.bearer(token)).await
    }

    /// Send an authenticated request and decode its JSON body
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.into_json()
    }

    /// Deliver the user-facing message for `err`
    pub fn report(&self, err: &ApiError) {
        self.notifier.error(&err.user_message());
    }

    fn activate(&self, token: &str, profile: ProfileInfo) {
        let person_id = profile.person_id;
        {
            let mut state = self.state.write();
            if state.token.as_deref() != Some(token) || state.person_id != Some(person_id) {
                self.generation.fetch_add(1, Ordering::SeqCst);
            }
            state.token = Some(token.to_string());
            state.person_id = Some(person_id);
            state.profile = Some(profile);
        }
        self.write_key(TOKEN_KEY, Some(token));
        self.write_key(PERSON_ID_KEY, Some(&person_id.to_string()));
    }

    fn reject(&self, reason: &str) {
        tracing::warn!(reason, "token rejected");
        self.clear();
        self.notifier.error(TOKEN_EXPIRED_MESSAGE);
    }

    fn read_key(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "failed to read session store");
            None
        })
    }

    fn write_key(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        };
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "failed to update session store");
        }
    }
}
