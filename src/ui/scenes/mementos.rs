//! Browsable list of the mementos unlocked so far.

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::content::Memento;
use crate::ui::clock::{BoxedTask, Immediate, Tween};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, Services};
use crate::ui::{slide_area, SCENE_TRANSITION, WIKI_SCENE};

pub struct MementosScene {
    services: Services,
    mementos: Vec<Memento>,
    selected: usize,
    offset: Rc<Cell<f64>>,
}

impl MementosScene {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
            mementos: Vec::new(),
            selected: 0,
            offset: Rc::new(Cell::new(1.0)),
        }
    }
}

impl Scene for MementosScene {
    fn on_create(&mut self, ctx: &SceneContext, _payload: Payload) {
        ctx.services.back.borrow_mut().set_handler(NavAction::pop());
    }

    fn on_display(&mut self, ctx: &SceneContext) -> BoxedTask {
        ctx.services.back.borrow_mut().set_handler(NavAction::pop());
        self.mementos = ctx.services.content.unlocked_mementos();
        self.selected = self.selected.min(self.mementos.len().saturating_sub(1));
        if ctx.is_popping {
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
                if self.selected + 1 < self.mementos.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter => {
                let memento = self.mementos.get(self.selected)?;
                Some(NavAction::push_with_loading(
                    WIKI_SCENE,
                    Payload::Memento(memento.clone()),
                ))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = slide_area(area, self.offset.get());

        let rows = self.mementos.len().max(1) as u16 + 3;
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(rows),
            Constraint::Fill(1),
        ])
        .areas(area);

        let l10n = &self.services.localization;
        let mut lines = vec![Line::from(l10n.text("MEMENTOS")).bold(), Line::default()];

        if self.mementos.is_empty() {
            lines.push(Line::from(l10n.text("MEMENTOS_EMPTY")).dim());
        } else {
            for (i, memento) in self.mementos.iter().enumerate() {
                let line = Line::from(memento.title.as_str());
                lines.push(if i == self.selected {
                    line.reversed()
                } else {
                    line
                });
            }
        }

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            middle,
        );
    }
}
