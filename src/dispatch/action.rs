use serde::{Deserialize, Serialize};
use std::fmt;

/// Arrow direction for [`OutputAction::DirectionalMove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    Left,
    Right,
    Up,
    Down,
}

/// Which neighbour a workspace or window command goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toward {
    Previous,
    Next,
}

/// Modifiers the device may hold across several actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Gui,
}

/// Logical output of one tick. Produced fresh, never stored.
///
/// The host turns these into key reports; the chords differ per OS and are
/// its business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputAction {
    #[default]
    None,
    MediaVolumeUp,
    MediaVolumeDown,
    DirectionalMove { heading: Heading },
    WorkspaceSwitch { toward: Toward },
    /// One step of the window switcher, sent while GUI is held.
    WindowSwitch { toward: Toward },
}

impl OutputAction {
    pub fn is_none(&self) -> bool {
        matches!(self, OutputAction::None)
    }
}

impl fmt::Display for OutputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputAction::None => write!(f, "none"),
            OutputAction::MediaVolumeUp => write!(f, "volume up"),
            OutputAction::MediaVolumeDown => write!(f, "volume down"),
            OutputAction::DirectionalMove { heading } => write!(f, "move {:?}", heading),
            OutputAction::WorkspaceSwitch { toward } => write!(f, "workspace {:?}", toward),
            OutputAction::WindowSwitch { toward } => write!(f, "window {:?}", toward),
        }
    }
}
