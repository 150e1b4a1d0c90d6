//! Single-slot registry mapping the global back key to a navigation action.
//!
//! Whichever scene currently owns the top bar arms the slot; dispatching it
//! disables the slot before the action is returned, so a second back press
//! during the resulting transition is a no-op until the next scene re-arms.

use crate::ui::scene::NavAction;

pub struct BackHandler {
    action: NavAction,
    enabled: bool,
}

impl BackHandler {
    pub fn new(action: NavAction) -> Self {
        Self {
            action,
            enabled: true,
        }
    }
}

#[derive(Default)]
pub struct BackDispatcher {
    slot: Option<BackHandler>,
}

impl BackDispatcher {
    pub fn set_handler(&mut self, action: NavAction) {
        self.slot = Some(BackHandler::new(action));
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if let Some(handler) = self.slot.as_mut() {
            handler.enabled = enabled;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.slot.as_ref().is_some_and(|h| h.enabled)
    }

    /// Take the armed action, disabling the slot in the same call.
    pub fn dispatch(&mut self) -> Option<NavAction> {
        match self.slot.as_mut() {
            Some(handler) if handler.enabled => {
                handler.enabled = false;
                Some(handler.action.clone())
            }
            _ => {
                log::debug!("back pressed with no armed handler");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_disables_the_slot() {
        let mut back = BackDispatcher::default();
        back.set_handler(NavAction::pop());

        assert!(back.is_armed());
        assert!(matches!(
            back.dispatch(),
            Some(NavAction::Pop { loading: false })
        ));
        assert!(!back.is_armed());
        assert!(back.dispatch().is_none());
    }

    #[test]
    fn rearming_replaces_the_previous_handler() {
        let mut back = BackDispatcher::default();
        back.set_handler(NavAction::pop());
        back.dispatch();

        back.set_handler(NavAction::Quit);
        assert!(matches!(back.dispatch(), Some(NavAction::Quit)));
    }

    #[test]
    fn disabled_slot_ignores_dispatch() {
        let mut back = BackDispatcher::default();
        back.set_handler(NavAction::pop());
        back.set_enabled(false);
        assert!(back.dispatch().is_none());

        back.set_enabled(true);
        assert!(back.dispatch().is_some());
    }

    #[test]
    fn empty_dispatcher_is_unarmed() {
        let mut back = BackDispatcher::default();
        assert!(!back.is_armed());
        assert!(back.dispatch().is_none());
    }
}
