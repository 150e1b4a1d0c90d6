//! Exhibit scanner. Drives a tracking session; detections are simulated from
//! the keyboard in place of a camera feed.

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::event::ListenerHandle;
use crate::settings::SCAN_HINT_SEEN_KEY;
use crate::ui::clock::{BoxedTask, Frames, WaitUntil};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, Services};
use crate::ui::{MAIN_MENU_SCENE, WIKI_SCENE};

/// Which instruction line is shown while nothing is tracked.
#[derive(Clone, Copy, PartialEq)]
enum Instruction {
    Undetected,
    LostTracking,
    InvalidCode,
}

impl Instruction {
    fn key(self) -> &'static str {
        match self {
            Instruction::Undetected => "UNDETECTED_INSTRUCTIONS",
            Instruction::LostTracking => "LOST_TRACKING_INSTRUCTIONS",
            Instruction::InvalidCode => "INVALID_QR_CODE_INSTRUCTIONS",
        }
    }
}

pub struct ScanScene {
    services: Services,
    instruction: Rc<Cell<Instruction>>,
    /// Index into the catalogue for the simulated-detection key.
    next_detection: usize,
    tracking_sub: Option<ListenerHandle>,
}

impl ScanScene {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
            instruction: Rc::new(Cell::new(Instruction::Undetected)),
            next_detection: 0,
            tracking_sub: None,
        }
    }

    fn hint_seen(&self) -> bool {
        self.services
            .settings
            .borrow()
            .get(SCAN_HINT_SEEN_KEY)
            .is_some()
    }

    /// Simulate fetching the detected exhibit's media. The load gate stays
    /// busy until the fetch completes, so a wiki push started right after a
    /// detection keeps its loading mask up long enough.
    fn begin_content_load(&self) {
        let token = self.services.load_gate.begin();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
                    token.complete();
                });
            }
            Err(_) => token.complete(),
        }
    }

    fn detect_next(&mut self) {
        if !self.hint_seen() {
            self.services
                .settings
                .borrow_mut()
                .set(SCAN_HINT_SEEN_KEY, "true");
        }
        let content = &self.services.content;
        if content.exhibit_count() == 0 {
            log::error!("no exhibits in the catalogue, nothing to detect");
            return;
        }
        let index = self.next_detection % content.exhibit_count();
        self.next_detection += 1;

        let exhibit = content.exhibits()[index].clone();
        self.services.tracker.simulate_detection(&exhibit.id);
        content.unlock_associated_mementos(&exhibit);
        self.begin_content_load();
    }

    fn open_wiki(&self) -> Option<NavAction> {
        let code = self.services.tracker.tracked_code()?;
        match self.services.content.exhibit(&code) {
            Some(exhibit) => Some(NavAction::push_with_loading(
                WIKI_SCENE,
                Payload::Exhibit(exhibit.clone()),
            )),
            None => {
                log::error!("tracked code {code:?} matches no exhibit");
                self.instruction.set(Instruction::InvalidCode);
                None
            }
        }
    }
}

impl Scene for ScanScene {
    fn on_create(&mut self, ctx: &SceneContext, _payload: Payload) {
        // Coming in fresh from the menu, any stale detection is meaningless.
        if ctx.last_scene == Some(MAIN_MENU_SCENE) {
            ctx.services.tracker.reset();
        }
        let instruction = self.instruction.clone();
        self.tracking_sub = Some(ctx.services.tracker.on_tracking_changed(move |&tracking| {
            if !tracking {
                instruction.set(Instruction::LostTracking);
            }
        }));
        ctx.services
            .back
            .borrow_mut()
            .set_handler(NavAction::Pop { loading: true });
    }

    fn on_display(&mut self, ctx: &SceneContext) -> BoxedTask {
        ctx.services
            .back
            .borrow_mut()
            .set_handler(NavAction::Pop { loading: true });
        ctx.services.tracker.start();
        // Always arrives behind the loading mask, nothing to animate.
        Box::new(Frames::new(1))
    }

    /// Hiding must not complete until the tracking session has fully shut
    /// down; the revealed or incoming scene may assume the hardware is free.
    fn on_hide(&mut self, _ctx: &SceneContext) -> BoxedTask {
        let tracker = self.services.tracker.clone();
        tracker.stop();
        Box::new(WaitUntil::new(move || tracker.is_safe_to_shut_down()))
    }

    fn on_remove(&mut self, _ctx: &SceneContext) {
        self.tracking_sub.take();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<NavAction> {
        match key.code {
            KeyCode::Char('t') => {
                self.detect_next();
                None
            }
            KeyCode::Char('x') => {
                log::error!("simulated detection of an unrecognized code");
                self.services.tracker.simulate_lost();
                self.instruction.set(Instruction::InvalidCode);
                None
            }
            KeyCode::Char('l') => {
                self.services.tracker.simulate_lost();
                None
            }
            KeyCode::Char('i') | KeyCode::Enter if self.services.tracker.is_tracking() => {
                self.open_wiki()
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Fill(1),
        ])
        .areas(area);

        let l10n = &self.services.localization;
        let tracker = &self.services.tracker;
        let mut lines = vec![Line::from(l10n.text("SCAN")).bold(), Line::default()];

        if tracker.is_tracking() {
            let title = tracker
                .tracked_code()
                .and_then(|code| {
                    self.services
                        .content
                        .exhibit(&code)
                        .map(|e| e.title.clone())
                })
                .unwrap_or_else(|| l10n.text("NO_CONTENT"));
            lines.push(Line::from(title).bold());
            lines.push(Line::from(l10n.text("SCAN_MORE_INFO")));
        } else {
            lines.push(Line::from(l10n.text(self.instruction.get().key())));
            if !self.hint_seen() {
                lines.push(Line::from(l10n.text("SCAN_HINT")).dim());
            }
        }
        lines.push(Line::default());
        lines.push(Line::from(l10n.text("SCAN_SIMULATE")).dim());

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            middle,
        );
    }
}
