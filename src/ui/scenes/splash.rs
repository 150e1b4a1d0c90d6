//! First-run language picker. Only reached when no language preference has
//! been saved yet; choosing one persists it and pushes the main menu.

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::settings::PREVIOUS_LANGUAGE_KEY;
use crate::ui::clock::{BoxedTask, Immediate, Tween};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, Services};
use crate::ui::{slide_area, MAIN_MENU_SCENE, SCENE_TRANSITION};

pub struct SplashScene {
    services: Services,
    languages: Vec<(String, String)>,
    selected: usize,
    offset: Rc<Cell<f64>>,
}

impl SplashScene {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
            languages: Vec::new(),
            selected: 0,
            offset: Rc::new(Cell::new(1.0)),
        }
    }
}

impl Scene for SplashScene {
    fn on_create(&mut self, _ctx: &SceneContext, _payload: Payload) {
        self.languages = self.services.localization.language_entries();
    }

    fn on_display(&mut self, ctx: &SceneContext) -> BoxedTask {
        // Root scene, nothing to slide in from.
        if ctx.last_scene.is_none() {
            self.offset.set(0.0);
            return Box::new(Immediate);
        }
        Box::new(Tween::new(self.offset.clone(), 1.0, 0.0, SCENE_TRANSITION))
    }

    fn on_hide(&mut self, _ctx: &SceneContext) -> BoxedTask {
        Box::new(Tween::new(self.offset.clone(), 0.0, 1.0, SCENE_TRANSITION))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<NavAction> {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.languages.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => {
                let (id, _) = self.languages.get(self.selected)?;
                self.services.localization.change_language(id);
                self.services
                    .settings
                    .borrow_mut()
                    .set(PREVIOUS_LANGUAGE_KEY, id.clone());
                Some(NavAction::push_with_loading(MAIN_MENU_SCENE, Payload::None))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = slide_area(area, self.offset.get());

        let rows = self.languages.len() as u16 + 4;
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(rows),
            Constraint::Fill(1),
        ])
        .areas(area);

        let mut lines = vec![Line::from("Gallery Guide").bold(), Line::default()];
        // Prompt in the highlighted language, since none is active yet.
        if let Some((id, _)) = self.languages.get(self.selected) {
            lines.push(Line::from(
                self.services.localization.text_in(id, "SPLASH_PROMPT"),
            ));
        }
        lines.push(Line::default());
        for (i, (_, name)) in self.languages.iter().enumerate() {
            let line = Line::from(name.as_str());
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
