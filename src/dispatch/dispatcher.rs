use super::action::OutputAction;
use super::table::ActionTable;
use crate::input::{Direction, Mode};
use tracing::debug;

/// Maps a classified direction and the current mode to a logical action
///
/// Pure lookup. Whether the action is actually emitted is decided by the
/// channel's rate limiter afterwards.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    table: ActionTable,
}

impl EventDispatcher {
    pub fn new(table: ActionTable) -> Self {
        Self { table }
    }

    pub fn dispatch(&self, direction: Direction, mode: Mode) -> OutputAction {
        if direction.is_neutral() {
            return OutputAction::None;
        }
        let action = self.table.lookup(direction, mode);
        debug!("Direction {} in mode {} maps to {}", direction, mode, action);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::action::Toward;
    use crate::dispatch::table::ActionPair;

    fn workspace_dispatcher() -> EventDispatcher {
        EventDispatcher::new(ActionTable::new(
            ActionPair::workspaces(),
            ActionPair::windows(),
        ))
    }

    #[test]
    fn neutral_never_dispatches() {
        let dispatcher = workspace_dispatcher();
        assert_eq!(dispatcher.dispatch(Direction::Neutral, Mode::A), OutputAction::None);
        assert_eq!(dispatcher.dispatch(Direction::Neutral, Mode::B), OutputAction::None);
    }

    #[test]
    fn same_direction_differs_per_mode() {
        let dispatcher = workspace_dispatcher();
        assert_eq!(
            dispatcher.dispatch(Direction::Negative, Mode::A),
            OutputAction::WorkspaceSwitch {
                toward: Toward::Previous
            }
        );
        assert_eq!(
            dispatcher.dispatch(Direction::Negative, Mode::B),
            OutputAction::WindowSwitch {
                toward: Toward::Previous
            }
        );
    }

    #[test]
    fn volume_table_is_mode_independent() {
        let dispatcher = EventDispatcher::new(ActionTable::uniform(ActionPair::volume()));
        for mode in [Mode::A, Mode::B] {
            assert_eq!(
                dispatcher.dispatch(Direction::Positive, mode),
                OutputAction::MediaVolumeUp
            );
            assert_eq!(
                dispatcher.dispatch(Direction::Negative, mode),
                OutputAction::MediaVolumeDown
            );
        }
    }
}
