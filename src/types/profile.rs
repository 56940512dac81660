use serde::{Deserialize, Serialize};

/// A player's profile as captured during setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProfile {
    /// Display name shown on the dashboard.
    pub username: String,

    /// Free-form bio.
    #[serde(default)]
    pub bio: String,

    /// Matchmaking region, e.g. "NA East".
    #[serde(default)]
    pub region: String,

    /// Self-described playstyle, e.g. "aggressive entry".
    #[serde(default)]
    pub playstyle: String,

    /// Preferred in-game role.
    #[serde(default)]
    pub main_role: String,

    /// Whether the player finished the setup flow. A missing profile reads
    /// as setup incomplete.
    #[serde(default)]
    pub setup_completed: bool,
}

/// One game tracked on a player's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserGame {
    /// The game's display name.
    pub game_name: String,

    /// Current rank in that game.
    #[serde(default)]
    pub rank: String,

    /// Total hours played.
    #[serde(default)]
    pub hours_played: u32,
}

impl PlayerProfile {
    /// Create a profile with the given username and everything else unset.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}

impl UserGame {
    /// Create a game entry with no rank and zero hours.
    pub fn new(game_name: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            rank: String::new(),
            hours_played: 0,
        }
    }
}
