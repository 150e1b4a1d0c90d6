pub mod back;
pub mod clock;
pub mod gate;
pub mod runner;
pub mod scene;
pub mod scenes;
pub mod stack;

#[cfg(test)]
mod test_stack;

use std::time::Duration;

use ratatui::layout::Rect;

pub use scene::{NavAction, Payload, Scene, SceneContext, SceneName, Services};
pub use stack::{NavigationStack, SceneRegistry};

pub const SPLASH_SCENE: SceneName = "SplashScene";
pub const MAIN_MENU_SCENE: SceneName = "MainMenuScene";
pub const SCAN_SCENE: SceneName = "ScanScene";
pub const WIKI_SCENE: SceneName = "WikiScene";
pub const MEMENTOS_SCENE: SceneName = "MementosScene";
pub const LOADING_SCENE: SceneName = "LoadingScene";

/// How long a scene's slide-in/out animation runs.
pub const SCENE_TRANSITION: Duration = Duration::from_millis(300);

/// Shift `area` to the right by `offset` of its own width, clipping at the
/// right edge. Scenes feed their tween value (1.0 = fully off-screen,
/// 0.0 = settled) through this when rendering.
pub fn slide_area(area: Rect, offset: f64) -> Rect {
    let offset = offset.clamp(0.0, 1.0);
    let shift = (f64::from(area.width) * offset).round() as u16;
    Rect {
        x: area.x.saturating_add(shift),
        width: area.width.saturating_sub(shift),
        ..area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_area_clips_at_the_right_edge() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(slide_area(area, 0.0), area);

        let half = slide_area(area, 0.5);
        assert_eq!(half.x, 50);
        assert_eq!(half.width, 50);

        let gone = slide_area(area, 1.0);
        assert_eq!(gone.width, 0);
    }

    #[test]
    fn slide_area_clamps_out_of_range_offsets() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(slide_area(area, -0.3), area);
        assert_eq!(slide_area(area, 2.0).width, 0);
    }
}
