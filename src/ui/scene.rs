//! The scene trait and the shared service handles every scene receives.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::content::{ContentLibrary, Exhibit, Memento};
use crate::settings::SettingsStore;
use crate::tracking::Tracker;
use crate::ui::back::BackDispatcher;
use crate::ui::clock::{BoxedTask, Immediate};
use crate::ui::gate::LoadGate;

pub use crate::content::localization::Localization;

pub type SceneName = &'static str;

/// Data handed to a scene when it is pushed.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    None,
    Exhibit(Exhibit),
    Memento(Memento),
}

/// Navigation request returned by a scene's input handler. Scenes never touch
/// the stack directly; the runner applies the action after the handler
/// returns, so a scene can never re-enter the stack mid-call.
#[derive(Debug, Clone)]
pub enum NavAction {
    Push {
        target: SceneName,
        loading: bool,
        payload: Payload,
    },
    Pop {
        loading: bool,
    },
    Quit,
}

impl NavAction {
    pub fn push(target: SceneName) -> Self {
        NavAction::Push {
            target,
            loading: false,
            payload: Payload::None,
        }
    }

    pub fn push_with_loading(target: SceneName, payload: Payload) -> Self {
        NavAction::Push {
            target,
            loading: true,
            payload,
        }
    }

    pub fn pop() -> Self {
        NavAction::Pop { loading: false }
    }
}

/// Shared handles to the app's collaborators. Cloning is cheap; every field
/// is a reference-counted handle to the same underlying state.
#[derive(Clone)]
pub struct Services {
    pub content: Rc<ContentLibrary>,
    pub localization: Rc<Localization>,
    pub tracker: Rc<Tracker>,
    pub back: Rc<RefCell<BackDispatcher>>,
    pub settings: Rc<RefCell<SettingsStore>>,
    pub load_gate: LoadGate,
}

impl Services {
    #[cfg(test)]
    pub fn for_tests() -> anyhow::Result<Self> {
        let settings = Rc::new(RefCell::new(SettingsStore::in_memory()));
        let load_gate = LoadGate::new();
        Ok(Self {
            content: Rc::new(ContentLibrary::from_embedded(settings.clone())?),
            localization: Rc::new(Localization::from_embedded()?),
            tracker: Rc::new(Tracker::new(load_gate.clone())),
            back: Rc::new(RefCell::new(BackDispatcher::default())),
            settings,
            load_gate,
        })
    }
}

/// Per-call context passed to lifecycle hooks. Owns its own clone of the
/// service handles so a scene borrowed mutably by the stack can still reach
/// everything it needs.
pub struct SceneContext {
    pub services: Services,
    /// True when this hook runs because a scene above was popped away.
    pub is_popping: bool,
    /// The scene that was on top before the current transition began.
    pub last_scene: Option<SceneName>,
}

/// A screen in the navigation stack.
///
/// Hooks run in a fixed order: `on_create` once when the scene is first
/// pushed, `on_display` every time it becomes the visible top (including
/// after a pop reveals it again), `on_hide` every time it stops being the
/// visible top, and `on_remove` once when it leaves the stack for good.
/// `on_display` and `on_hide` return frame tasks; the transition that
/// triggered the hook is not finished until the task completes.
pub trait Scene {
    fn on_create(&mut self, ctx: &SceneContext, payload: Payload);

    fn on_display(&mut self, ctx: &SceneContext) -> BoxedTask {
        let _ = ctx;
        Box::new(Immediate)
    }

    fn on_hide(&mut self, ctx: &SceneContext) -> BoxedTask {
        let _ = ctx;
        Box::new(Immediate)
    }

    fn on_remove(&mut self, ctx: &SceneContext) {
        let _ = ctx;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<NavAction> {
        let _ = key;
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let _ = (frame, area);
    }
}
