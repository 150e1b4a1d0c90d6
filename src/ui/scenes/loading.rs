//! Full-screen mask shown while a push or pop does its heavy lifting.

use std::cell::Cell;
use std::rc::Rc;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::ui::clock::{BoxedTask, Seq, Timed, Tween, WaitUntil};
use crate::ui::scene::{Payload, Scene, SceneContext, Services};
use crate::ui::{slide_area, SCENE_TRANSITION};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct LoadingScene {
    services: Services,
    spinner: usize,
    offset: Rc<Cell<f64>>,
}

impl LoadingScene {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
            spinner: 0,
            offset: Rc::new(Cell::new(1.0)),
        }
    }
}

impl Scene for LoadingScene {
    fn on_create(&mut self, _ctx: &SceneContext, _payload: Payload) {}

    fn on_display(&mut self, _ctx: &SceneContext) -> BoxedTask {
        // Slide in, then dwell a beat so the mask never just flashes.
        Box::new(Seq::new(vec![
            Box::new(Tween::new(self.offset.clone(), 1.0, 0.0, SCENE_TRANSITION)),
            Box::new(Timed::new(SCENE_TRANSITION)),
        ]))
    }

    /// The mask may not leave while background loads are still in flight.
    fn on_hide(&mut self, _ctx: &SceneContext) -> BoxedTask {
        let gate = self.services.load_gate.clone();
        Box::new(Seq::new(vec![
            Box::new(WaitUntil::new(move || gate.idle())),
            Box::new(Tween::new(
                self.offset.clone(),
                0.0,
                1.0,
                SCENE_TRANSITION / 2,
            )),
        ]))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = slide_area(area, self.offset.get());
        self.spinner = (self.spinner + 1) % SPINNER_FRAMES.len();

        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        let line = Line::from(format!(
            "{} {}",
            SPINNER_FRAMES[self.spinner],
            self.services.localization.text("LOADING")
        ))
        .bold();
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), middle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::clock::Step;
    use std::time::Duration;

    #[test]
    fn hide_waits_for_in_flight_loads() {
        let services = Services::for_tests().unwrap();
        let mut scene = LoadingScene::new(&services);
        let ctx = SceneContext {
            services: services.clone(),
            is_popping: false,
            last_scene: None,
        };

        let token = services.load_gate.begin();
        let mut task = scene.on_hide(&ctx);
        let dt = Duration::from_millis(400);
        assert_eq!(task.step(dt), Step::Yield);
        assert_eq!(task.step(dt), Step::Yield);

        token.complete();
        // One frame to pass the gate, then the slide-out finishes.
        assert_eq!(task.step(dt), Step::Yield);
        assert_eq!(task.step(dt), Step::Done);
        assert_eq!(scene.offset.get(), 1.0);
    }
}
