//! Target-group selection and actor classification.

use serde::{Deserialize, Serialize};

/// One selectable group of actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGroup {
    /// The controlling actor.
    Player,
    /// Other peer actors of the same broad category.
    Humans,
    /// Adversarial actors.
    Aliens,
}

impl TargetGroup {
    pub const ALL: [TargetGroup; 3] = [Self::Player, Self::Humans, Self::Aliens];

    const fn bit(self) -> u8 {
        match self {
            Self::Player => 1 << 0,
            Self::Humans => 1 << 1,
            Self::Aliens => 1 << 2,
        }
    }
}

/// Bitset of [`TargetGroup`]s.
///
/// Serializes as a list of group names, e.g. `["player", "aliens"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TargetGroup>", into = "Vec<TargetGroup>")]
pub struct TargetGroups(u8);

impl TargetGroups {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b111);

    #[must_use]
    pub const fn with(self, group: TargetGroup) -> Self {
        Self(self.0 | group.bit())
    }

    #[must_use]
    pub const fn without(self, group: TargetGroup) -> Self {
        Self(self.0 & !group.bit())
    }

    #[must_use]
    pub const fn contains(self, group: TargetGroup) -> bool {
        self.0 & group.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether an actor of `class` falls inside the selection.
    ///
    /// Evaluated against the classification the host reports right now;
    /// nothing is cached between calls.
    #[must_use]
    pub fn matches(self, class: ActorClass) -> bool {
        class.group().is_some_and(|group| self.contains(group))
    }

    pub fn iter(self) -> impl Iterator<Item = TargetGroup> {
        TargetGroup::ALL
            .into_iter()
            .filter(move |group| self.contains(*group))
    }
}

impl FromIterator<TargetGroup> for TargetGroups {
    fn from_iter<I: IntoIterator<Item = TargetGroup>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl From<Vec<TargetGroup>> for TargetGroups {
    fn from(groups: Vec<TargetGroup>) -> Self {
        groups.into_iter().collect()
    }
}

impl From<TargetGroups> for Vec<TargetGroup> {
    fn from(groups: TargetGroups) -> Self {
        groups.iter().collect()
    }
}

/// How the host classifies an actor at the moment of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorClass {
    /// Controlled by the local player.
    Controlling,
    /// An active actor of the player's broad category, not player controlled.
    Peer,
    /// An adversarial actor.
    Adversarial,
    /// Eliminated or otherwise inactive; never targeted.
    Inactive,
}

impl ActorClass {
    #[must_use]
    pub const fn group(self) -> Option<TargetGroup> {
        match self {
            Self::Controlling => Some(TargetGroup::Player),
            Self::Peer => Some(TargetGroup::Humans),
            Self::Adversarial => Some(TargetGroup::Aliens),
            Self::Inactive => None,
        }
    }
}

/// Scope of an all-or-nothing override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusiveTargets {
    #[default]
    Off,
    PlayerOnly,
    All,
}

impl ExclusiveTargets {
    /// `controlled_by_player` is only consulted for [`ExclusiveTargets::PlayerOnly`].
    #[must_use]
    pub fn applies(self, controlled_by_player: bool) -> bool {
        match self {
            Self::Off => false,
            Self::PlayerOnly => controlled_by_player,
            Self::All => true,
        }
    }
}
