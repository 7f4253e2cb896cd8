//! Menu of the hub's games.

use serde::Serialize;

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameEntry {
    /// Stable identifier used in routes.
    pub id: &'static str,
    /// Display title.
    pub title: &'static str,
    /// `true` when state is shared through the document store.
    pub realtime: bool,
}

const CATALOG: &[GameEntry] = &[
    GameEntry {
        id: "qibla-compass",
        title: "Qibla Compass",
        realtime: false,
    },
    GameEntry {
        id: "online-tic-tac-toe",
        title: "Online Tic-Tac-Toe",
        realtime: true,
    },
    GameEntry {
        id: "chat",
        title: "Chat Room",
        realtime: true,
    },
    GameEntry {
        id: "tic-tac-toe",
        title: "Tic-Tac-Toe",
        realtime: false,
    },
    GameEntry {
        id: "number-guess",
        title: "Guess the Number",
        realtime: false,
    },
    GameEntry {
        id: "rock-paper-scissors",
        title: "Rock Paper Scissors",
        realtime: false,
    },
    GameEntry {
        id: "memory",
        title: "Memory Match",
        realtime: false,
    },
    GameEntry {
        id: "clicker",
        title: "Clicker",
        realtime: false,
    },
];

/// All entries in menu order.
#[must_use]
pub fn catalog() -> &'static [GameEntry] {
    CATALOG
}

/// Looks up an entry by id.
#[must_use]
pub fn find_game(id: &str) -> Option<&'static GameEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}
