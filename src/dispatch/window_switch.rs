use super::action::{Modifier, OutputAction, Toward};
use crate::time::Millis;
use tracing::debug;

/// What the host has to do for one window-switcher step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowStep {
    /// Modifier to press before the action, on the first step only.
    pub hold: Option<Modifier>,
    pub action: OutputAction,
}

/// Alt-tab style window cycling
///
/// The first step holds GUI so the OS switcher stays open, later steps only
/// move the selection. Once `hold_timeout_ms` passes without a step the tick
/// releases GUI, which commits the selection.
#[derive(Debug, Clone)]
pub struct WindowSwitcher {
    hold_timeout_ms: u32,
    /// Time of the last step while GUI is held.
    held_since_step: Option<Millis>,
}

impl WindowSwitcher {
    pub const MODIFIER: Modifier = Modifier::Gui;

    pub fn new(hold_timeout_ms: u32) -> Self {
        Self {
            hold_timeout_ms,
            held_since_step: None,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.held_since_step.is_some()
    }

    pub fn step(&mut self, toward: Toward, now: Millis) -> WindowStep {
        let hold = if self.held_since_step.is_none() {
            debug!("Holding {:?} for window switching", Self::MODIFIER);
            Some(Self::MODIFIER)
        } else {
            None
        };
        self.held_since_step = Some(now);
        WindowStep {
            hold,
            action: OutputAction::WindowSwitch { toward },
        }
    }

    /// Returns the modifier to release once the hold has timed out.
    pub fn expire(&mut self, now: Millis) -> Option<Modifier> {
        let last = self.held_since_step?;
        if now.elapsed_since(last) > self.hold_timeout_ms {
            debug!("Window switch hold expired after {}ms", self.hold_timeout_ms);
            self.held_since_step = None;
            Some(Self::MODIFIER)
        } else {
            None
        }
    }

    /// Ends a running hold without waiting for the timeout.
    pub fn release_now(&mut self) -> Option<Modifier> {
        self.held_since_step.take().map(|_| Self::MODIFIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_holds_gui_once() {
        let mut switcher = WindowSwitcher::new(1000);
        let first = switcher.step(Toward::Next, Millis(0));
        assert_eq!(first.hold, Some(Modifier::Gui));
        let second = switcher.step(Toward::Previous, Millis(300));
        assert_eq!(second.hold, None);
        assert_eq!(
            second.action,
            OutputAction::WindowSwitch {
                toward: Toward::Previous
            }
        );
    }

    #[test]
    fn hold_released_after_timeout_from_last_step() {
        let mut switcher = WindowSwitcher::new(1000);
        switcher.step(Toward::Next, Millis(0));
        switcher.step(Toward::Next, Millis(800));
        assert_eq!(switcher.expire(Millis(1500)), None);
        assert_eq!(switcher.expire(Millis(1801)), Some(Modifier::Gui));
        assert!(!switcher.is_holding());
        assert_eq!(switcher.expire(Millis(5000)), None);
    }

    #[test]
    fn release_now_only_when_holding() {
        let mut switcher = WindowSwitcher::new(1000);
        assert_eq!(switcher.release_now(), None);
        switcher.step(Toward::Next, Millis(0));
        assert_eq!(switcher.release_now(), Some(Modifier::Gui));
        assert!(!switcher.is_holding());
        assert_eq!(switcher.expire(Millis(2000)), None);
    }
}
