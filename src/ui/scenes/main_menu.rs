//! Root menu: scan an exhibit, browse collected mementos, or quit.

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::ui::clock::{BoxedTask, Immediate, Tween};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, Services};
use crate::ui::{slide_area, MEMENTOS_SCENE, SCAN_SCENE, SCENE_TRANSITION};

const ENTRIES: &[(&str, char)] = &[
    ("MENU_SCAN", 's'),
    ("MENU_MEMENTOS", 'm'),
    ("MENU_QUIT", 'q'),
];

pub struct MainMenuScene {
    services: Services,
    selected: usize,
    offset: Rc<Cell<f64>>,
}

impl MainMenuScene {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
            selected: 0,
            offset: Rc::new(Cell::new(1.0)),
        }
    }

    fn activate(&self, index: usize) -> Option<NavAction> {
        match index {
            0 => Some(NavAction::push_with_loading(SCAN_SCENE, Payload::None)),
            1 => {
                if self.services.content.unlocked_count() == 0 {
                    log::debug!("mementos entry disabled, nothing unlocked yet");
                    None
                } else {
                    Some(NavAction::push(MEMENTOS_SCENE))
                }
            }
            _ => Some(NavAction::Quit),
        }
    }
}

impl Scene for MainMenuScene {
    fn on_create(&mut self, ctx: &SceneContext, _payload: Payload) {
        ctx.services.back.borrow_mut().set_handler(NavAction::Quit);
    }

    fn on_display(&mut self, ctx: &SceneContext) -> BoxedTask {
        // Dispatching back disabled the slot; arm it again whenever we come
        // back to the top.
        ctx.services.back.borrow_mut().set_handler(NavAction::Quit);
        // No slide when re-revealed by a pop, or when this is the root scene
        // with nothing to slide in from.
        if ctx.is_popping || ctx.last_scene.is_none() {
            self.offset.set(0.0);
            Box::new(Immediate)
        } else {
            Box::new(Tween::new(self.offset.clone(), 1.0, 0.0, SCENE_TRANSITION))
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<NavAction> {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < ENTRIES.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => self.activate(self.selected),
            KeyCode::Char(c) => ENTRIES
                .iter()
                .position(|&(_, hotkey)| hotkey == c)
                .and_then(|i| self.activate(i)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = slide_area(area, self.offset.get());

        let rows = ENTRIES.len() as u16 + 4;
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(rows),
            Constraint::Fill(1),
        ])
        .areas(area);

        let l10n = &self.services.localization;
        let mut lines = vec![
            Line::from("Gallery Guide").bold(),
            Line::from(format!(
                "{}: {}",
                l10n.text("MEMENTOS"),
                self.services.content.unlocked_count()
            ))
            .dim(),
            Line::default(),
        ];
        for (i, (key, hotkey)) in ENTRIES.iter().enumerate() {
            let mut line = Line::from(format!("[{hotkey}] {}", l10n.text(key)));
            if i == 1 && self.services.content.unlocked_count() == 0 {
                line = line.dim();
            }
            lines.push(if i == self.selected {
                line.reversed()
            } else {
                line
            });
        }

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            middle,
        );
    }
}
