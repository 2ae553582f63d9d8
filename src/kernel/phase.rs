use serde::{Deserialize, Serialize};

/// The discrete stages of the daily ritual workflow.
/// Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Process started, nothing shown yet.
    Void,
    Splash,
    Intro,
    Onboarding,
    Auth,
    Home,
    /// Candidates are on screen and the user is choosing.
    Ritual,
    /// A candidate was committed. Sealed until the next day.
    Seal,
    Wardrobe,
    Profile,
    Camera,
    FriendsFeed,
    AiChat,
    /// Universal interrupt. Reachable from every phase, not terminal.
    Safety,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Void
    }
}

impl Phase {
    pub const ALL: [Phase; 14] = [
        Phase::Void,
        Phase::Splash,
        Phase::Intro,
        Phase::Onboarding,
        Phase::Auth,
        Phase::Home,
        Phase::Ritual,
        Phase::Seal,
        Phase::Wardrobe,
        Phase::Profile,
        Phase::Camera,
        Phase::FriendsFeed,
        Phase::AiChat,
        Phase::Safety,
    ];

    /// Plain screens that `advance_to` may move to from anywhere.
    /// Void, Ritual, Seal and Safety each have their own operation.
    pub fn is_navigational(self) -> bool {
        !matches!(self, Phase::Void | Phase::Ritual | Phase::Seal | Phase::Safety)
    }
}

/// Transient swipe hint raised while a candidate is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionSignal {
    None,
    Left,
    Right,
    Down,
}

impl Default for InteractionSignal {
    fn default() -> Self {
        Self::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigational_set_excludes_guarded_phases() {
        let guarded: Vec<Phase> = Phase::ALL
            .iter()
            .copied()
            .filter(|p| !p.is_navigational())
            .collect();
        assert_eq!(guarded, vec![Phase::Void, Phase::Ritual, Phase::Seal, Phase::Safety]);
    }

    #[test]
    fn defaults() {
        assert_eq!(Phase::default(), Phase::Void);
        assert_eq!(InteractionSignal::default(), InteractionSignal::None);
    }
}
