//! Navigation stack lifecycle ordering tests, driven by stub scenes that
//! journal every hook call.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::ui::clock::{BoxedTask, Frames, WaitUntil};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, Services};
use crate::ui::stack::{NavigationStack, SceneRegistry};
use crate::ui::{LOADING_SCENE, MAIN_MENU_SCENE, SCAN_SCENE, WIKI_SCENE};

const DT: Duration = Duration::from_millis(16);

type Journal = Rc<RefCell<Vec<String>>>;

struct StubScene {
    tag: &'static str,
    journal: Journal,
    display_frames: u32,
    hide_frames: u32,
    /// When set, hiding also waits for this flag to flip.
    hide_gate: Option<Rc<Cell<bool>>>,
}

impl Scene for StubScene {
    fn on_create(&mut self, _ctx: &SceneContext, payload: Payload) {
        let entry = match payload {
            Payload::None => format!("{}.create", self.tag),
            Payload::Exhibit(e) => format!("{}.create({})", self.tag, e.id),
            Payload::Memento(m) => format!("{}.create({})", self.tag, m.id),
        };
        self.journal.borrow_mut().push(entry);
    }

    fn on_display(&mut self, ctx: &SceneContext) -> BoxedTask {
        let entry = if ctx.is_popping {
            format!("{}.display(popping)", self.tag)
        } else {
            format!("{}.display", self.tag)
        };
        self.journal.borrow_mut().push(entry);
        Box::new(Frames::new(self.display_frames))
    }

    fn on_hide(&mut self, _ctx: &SceneContext) -> BoxedTask {
        self.journal.borrow_mut().push(format!("{}.hide", self.tag));
        match &self.hide_gate {
            Some(gate) => {
                let gate = gate.clone();
                Box::new(WaitUntil::new(move || gate.get()))
            }
            None => Box::new(Frames::new(self.hide_frames)),
        }
    }

    fn on_remove(&mut self, _ctx: &SceneContext) {
        self.journal.borrow_mut().push(format!("{}.remove", self.tag));
    }

    fn handle_key(&mut self, _key: crossterm::event::KeyEvent) -> Option<NavAction> {
        self.journal.borrow_mut().push(format!("{}.key", self.tag));
        None
    }
}

struct Fixture {
    stack: NavigationStack,
    journal: Journal,
}

fn fixture() -> Fixture {
    fixture_with_gate(None)
}

/// Stub scenes for menu/scan/wiki/loading; `scan_hide_gate` makes the scan
/// scene's hide task block until the flag flips.
fn fixture_with_gate(scan_hide_gate: Option<Rc<Cell<bool>>>) -> Fixture {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut registry = SceneRegistry::new();

    let stub = |tag: &'static str, journal: &Journal, gate: Option<Rc<Cell<bool>>>| {
        let journal = journal.clone();
        move |_: &Services| -> Box<dyn Scene> {
            Box::new(StubScene {
                tag,
                journal: journal.clone(),
                display_frames: 2,
                hide_frames: 2,
                hide_gate: gate.clone(),
            })
        }
    };

    registry.register(MAIN_MENU_SCENE, stub("menu", &journal, None));
    registry.register(SCAN_SCENE, stub("scan", &journal, scan_hide_gate));
    registry.register(WIKI_SCENE, stub("wiki", &journal, None));
    registry.register(LOADING_SCENE, stub("loading", &journal, None));

    let services = Services::for_tests().unwrap();
    Fixture {
        stack: NavigationStack::new(registry, services),
        journal,
    }
}

fn settle(stack: &mut NavigationStack) {
    for _ in 0..200 {
        if !stack.in_transition() {
            return;
        }
        stack.tick(DT);
    }
    panic!("transition did not settle within 200 ticks");
}

fn key(code: crossterm::event::KeyCode) -> crossterm::event::KeyEvent {
    crossterm::event::KeyEvent::new(code, crossterm::event::KeyModifiers::NONE)
}

impl Fixture {
    fn entries(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    fn clear(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Push the menu as the root scene and settle.
    fn with_root(mut self) -> Self {
        self.stack.push(MAIN_MENU_SCENE, false, Payload::None);
        settle(&mut self.stack);
        self.clear();
        self
    }
}

#[test]
fn first_push_creates_and_displays_with_nothing_to_hide() {
    let mut fx = fixture();
    fx.stack.push(MAIN_MENU_SCENE, false, Payload::None);
    assert!(fx.stack.in_transition());
    settle(&mut fx.stack);

    assert_eq!(fx.entries(), vec!["menu.create", "menu.display"]);
    assert_eq!(fx.stack.depth(), 1);
    assert_eq!(fx.stack.last_scene(), None);
}

#[test]
fn direct_push_interleaves_previous_hide_with_incoming_display() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, false, Payload::None);
    settle(&mut fx.stack);

    assert_eq!(
        fx.entries(),
        vec!["scan.create", "scan.display", "menu.hide"]
    );
    assert_eq!(fx.stack.depth(), 2);
    assert_eq!(fx.stack.last_scene(), Some(MAIN_MENU_SCENE));
}

#[test]
fn push_with_loading_masks_the_whole_handoff() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, true, Payload::None);
    settle(&mut fx.stack);

    assert_eq!(
        fx.entries(),
        vec![
            "loading.create",
            "loading.display",
            "menu.hide",
            "scan.create",
            "scan.display",
            "loading.hide",
            "loading.remove",
        ]
    );
    // The menu stays on the stack, suspended under the scan scene.
    assert_eq!(fx.stack.depth(), 2);
    assert_eq!(fx.stack.last_scene(), Some(MAIN_MENU_SCENE));
}

#[test]
fn pop_hides_removes_then_redisplays_the_revealed_scene() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, false, Payload::None);
    settle(&mut fx.stack);
    fx.clear();

    fx.stack.pop(false);
    assert!(fx.stack.is_popping());
    settle(&mut fx.stack);

    assert_eq!(
        fx.entries(),
        vec!["scan.hide", "scan.remove", "menu.display(popping)"]
    );
    assert_eq!(fx.stack.depth(), 1);
    assert_eq!(fx.stack.last_scene(), Some(SCAN_SCENE));
    assert!(!fx.stack.is_popping());
}

#[test]
fn pop_with_loading_masks_teardown_and_reveal() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, true, Payload::None);
    settle(&mut fx.stack);
    fx.clear();

    fx.stack.pop(true);
    settle(&mut fx.stack);

    assert_eq!(
        fx.entries(),
        vec![
            "loading.create",
            "loading.display",
            "scan.hide",
            "scan.remove",
            "menu.display(popping)",
            "loading.hide",
            "loading.remove",
        ]
    );
    assert_eq!(fx.stack.depth(), 1);
}

#[test]
fn suspended_scene_is_never_removed_while_covered() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, true, Payload::None);
    settle(&mut fx.stack);
    fx.stack.push(WIKI_SCENE, true, Payload::None);
    settle(&mut fx.stack);

    assert!(!fx.entries().iter().any(|e| e == "menu.remove"));
    assert!(!fx.entries().iter().any(|e| e == "scan.remove"));
    assert_eq!(fx.stack.depth(), 3);
}

#[test]
fn remove_fires_exactly_once_per_scene() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, false, Payload::None);
    settle(&mut fx.stack);
    fx.stack.pop(false);
    settle(&mut fx.stack);

    let removes = fx
        .entries()
        .iter()
        .filter(|e| e.as_str() == "scan.remove")
        .count();
    assert_eq!(removes, 1);
}

#[test]
fn navigation_is_rejected_while_a_transition_is_in_flight() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, false, Payload::None);
    assert!(fx.stack.in_transition());

    // Both of these land mid-transition and must be dropped.
    fx.stack.push(WIKI_SCENE, false, Payload::None);
    fx.stack.pop(false);
    settle(&mut fx.stack);

    assert_eq!(fx.stack.depth(), 2);
    assert!(!fx.entries().iter().any(|e| e.starts_with("wiki.")));
}

#[test]
fn input_is_swallowed_during_a_transition() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, false, Payload::None);

    assert!(fx
        .stack
        .handle_key(key(crossterm::event::KeyCode::Enter))
        .is_none());
    assert!(!fx.entries().iter().any(|e| e.ends_with(".key")));

    settle(&mut fx.stack);
    fx.stack.handle_key(key(crossterm::event::KeyCode::Enter));
    assert!(fx.entries().iter().any(|e| e == "scan.key"));
}

#[test]
fn the_root_scene_cannot_be_popped() {
    let mut fx = fixture().with_root();
    fx.stack.pop(false);

    assert!(!fx.stack.in_transition());
    assert_eq!(fx.stack.depth(), 1);
    assert!(fx.entries().is_empty());
}

#[test]
fn gated_hide_holds_the_transition_until_released() {
    let gate = Rc::new(Cell::new(false));
    let mut fx = fixture_with_gate(Some(gate.clone())).with_root();
    fx.stack.push(SCAN_SCENE, false, Payload::None);
    settle(&mut fx.stack);
    fx.clear();

    fx.stack.pop(false);
    for _ in 0..50 {
        fx.stack.tick(DT);
    }
    // Scan's hide task is still waiting, so it has not been removed.
    assert!(fx.stack.in_transition());
    assert!(!fx.entries().iter().any(|e| e == "scan.remove"));

    gate.set(true);
    settle(&mut fx.stack);
    assert_eq!(fx.stack.depth(), 1);
    assert!(fx.entries().iter().any(|e| e == "scan.remove"));
}

#[test]
fn payload_reaches_the_scene_created_behind_the_mask() {
    let mut fx = fixture().with_root();
    let memento = crate::content::Memento {
        id: "silver-dart-prop".into(),
        title: "Laminated Propeller".into(),
        info: String::new(),
    };
    fx.stack
        .push(WIKI_SCENE, true, Payload::Memento(memento));
    settle(&mut fx.stack);

    assert!(fx
        .entries()
        .iter()
        .any(|e| e == "wiki.create(silver-dart-prop)"));
}

#[test]
fn quit_action_reports_back_to_the_caller() {
    let mut fx = fixture().with_root();
    assert!(fx.stack.apply(NavAction::Quit));
    assert!(!fx.stack.apply(NavAction::pop()));
}

#[test]
fn last_scene_tracks_the_previous_top_during_a_push() {
    let mut fx = fixture().with_root();
    fx.stack.push(SCAN_SCENE, true, Payload::None);
    // Mid-transition the previous top is already reported.
    assert_eq!(fx.stack.last_scene(), Some(MAIN_MENU_SCENE));
    settle(&mut fx.stack);
    assert_eq!(fx.stack.last_scene(), Some(MAIN_MENU_SCENE));
}
