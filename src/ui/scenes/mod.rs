pub mod loading;
pub mod main_menu;
pub mod mementos;
pub mod scan;
pub mod splash;
pub mod wiki;

pub use loading::LoadingScene;
pub use main_menu::MainMenuScene;
pub use mementos::MementosScene;
pub use scan::ScanScene;
pub use splash::SplashScene;
pub use wiki::WikiScene;
