//! Shared application state.

use std::fmt;
use std::sync::Arc;

use qiblahub_chat::ChatFeed;
use qiblahub_compass::GeoPoint;
use qiblahub_core::clock::Clock;
use qiblahub_core::error::DomainError;
use qiblahub_core::store::DocumentStore;
use qiblahub_match::MatchLobby;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store shared by every match and chat request.
    pub store: Arc<dyn DocumentStore>,
    /// Clock used for match and chat timestamps.
    pub clock: Arc<dyn Clock>,
    /// Point the compass aims at.
    pub qibla_target: GeoPoint,
    /// Standing subscription behind the open-match listing.
    pub lobby: Arc<MatchLobby>,
    /// Standing subscription behind the recent-messages listing.
    pub chat: Arc<ChatFeed>,
}

impl AppState {
    /// Create new application state, opening the lobby and chat
    /// subscriptions that every listing request reads from.
    ///
    /// # Errors
    ///
    /// Returns a store error if either subscription cannot be opened.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        qibla_target: GeoPoint,
    ) -> Result<Self, DomainError> {
        let lobby = MatchLobby::open(&*store).await?;
        let chat = ChatFeed::open(&*store, None).await?;
        Ok(Self {
            store,
            clock,
            qibla_target,
            lobby: Arc::new(lobby),
            chat: Arc::new(chat),
        })
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("qibla_target", &self.qibla_target)
            .finish_non_exhaustive()
    }
}
