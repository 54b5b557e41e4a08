use super::action::{Heading, OutputAction, Toward};
use crate::input::{Direction, Mode};
use serde::{Deserialize, Serialize};

/// Actions for the two non-neutral directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionPair {
    #[serde(default)]
    pub negative: OutputAction,
    #[serde(default)]
    pub positive: OutputAction,
}

impl ActionPair {
    pub const fn new(negative: OutputAction, positive: OutputAction) -> Self {
        Self { negative, positive }
    }

    pub const fn volume() -> Self {
        Self::new(OutputAction::MediaVolumeDown, OutputAction::MediaVolumeUp)
    }

    pub const fn arrows() -> Self {
        Self::new(
            OutputAction::DirectionalMove {
                heading: Heading::Left,
            },
            OutputAction::DirectionalMove {
                heading: Heading::Right,
            },
        )
    }

    pub const fn workspaces() -> Self {
        Self::new(
            OutputAction::WorkspaceSwitch {
                toward: Toward::Previous,
            },
            OutputAction::WorkspaceSwitch {
                toward: Toward::Next,
            },
        )
    }

    pub const fn windows() -> Self {
        Self::new(
            OutputAction::WindowSwitch {
                toward: Toward::Previous,
            },
            OutputAction::WindowSwitch {
                toward: Toward::Next,
            },
        )
    }

    pub fn get(&self, direction: Direction) -> OutputAction {
        match direction {
            Direction::Negative => self.negative,
            Direction::Neutral => OutputAction::None,
            Direction::Positive => self.positive,
        }
    }
}

/// Per-mode action table of one slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionTable {
    #[serde(default)]
    pub a: ActionPair,
    #[serde(default)]
    pub b: ActionPair,
}

impl ActionTable {
    pub const fn new(a: ActionPair, b: ActionPair) -> Self {
        Self { a, b }
    }

    /// Same pair in both modes.
    pub const fn uniform(pair: ActionPair) -> Self {
        Self { a: pair, b: pair }
    }

    pub fn pair(&self, mode: Mode) -> &ActionPair {
        match mode {
            Mode::A => &self.a,
            Mode::B => &self.b,
        }
    }

    pub fn lookup(&self, direction: Direction, mode: Mode) -> OutputAction {
        self.pair(mode).get(direction)
    }

    pub fn is_empty(&self) -> bool {
        [self.a, self.b]
            .iter()
            .all(|pair| pair.negative.is_none() && pair.positive.is_none())
    }
}
