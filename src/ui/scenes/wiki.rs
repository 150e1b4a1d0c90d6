//! Detail page for an exhibit or a memento, pushed with a payload.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::clock::{BoxedTask, Frames};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, Services};

pub struct WikiScene {
    services: Services,
    title: String,
    info: String,
    image: Option<String>,
    scroll: u16,
}

impl WikiScene {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
            title: String::new(),
            info: String::new(),
            image: None,
            scroll: 0,
        }
    }
}

impl Scene for WikiScene {
    fn on_create(&mut self, ctx: &SceneContext, payload: Payload) {
        match payload {
            Payload::Exhibit(exhibit) => {
                self.title = exhibit.title;
                self.info = exhibit.info;
                self.image = exhibit.image;
            }
            Payload::Memento(memento) => {
                self.title = memento.title;
                self.info = memento.info;
            }
            // Reaching the wiki without content is a wiring bug, same class
            // as an unregistered scene name.
            Payload::None => panic!("wiki scene pushed without a payload"),
        }
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
        // Appears behind the loading mask, so no slide; a couple of frames
        // lets the layout settle before the mask lifts.
        Box::new(Frames::new(3))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<NavAction> {
        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let l10n = &self.services.localization;

        let [header, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(area);

        let mut title = Line::from(self.title.as_str()).bold();
        if let Some(image) = &self.image {
            title.push_span(format!("  [{image}]").dim());
        }
        frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), header);

        let block = Block::default()
            .borders(Borders::TOP)
            .title(l10n.text("INFO"));
        frame.render_widget(
            Paragraph::new(self.info.as_str())
                .wrap(Wrap { trim: true })
                .scroll((self.scroll, 0))
                .block(block),
            body,
        );
    }
}
