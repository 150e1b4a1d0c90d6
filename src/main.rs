#![allow(warnings)]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;
mod content;
mod event;
mod settings;
mod tracking;
mod ui;

use cli::Cli;
use content::{localization::Localization, ContentLibrary};
use settings::{SettingsStore, PREVIOUS_LANGUAGE_KEY};
use tracking::Tracker;
use ui::gate::LoadGate;
use ui::scenes::{
    LoadingScene, MainMenuScene, MementosScene, ScanScene, SplashScene, WikiScene,
};
use ui::{
    NavigationStack, Payload, SceneRegistry, Services, LOADING_SCENE, MAIN_MENU_SCENE,
    MEMENTOS_SCENE, SCAN_SCENE, SPLASH_SCENE, WIKI_SCENE,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("gallery-guide.log")?;
    let mut logger = env_logger::Builder::from_default_env();
    if let Some(filter) = &cli.log_level {
        logger.parse_filters(filter);
    }
    logger
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Starting gallery-guide");

    let settings = Rc::new(RefCell::new(SettingsStore::load()?));
    if cli.reset {
        settings.borrow_mut().clear();
        info!("Saved settings wiped");
    }

    let load_gate = LoadGate::new();
    let localization = Rc::new(Localization::from_embedded()?);
    let services = Services {
        content: Rc::new(ContentLibrary::from_embedded(settings.clone())?),
        localization: localization.clone(),
        tracker: Rc::new(Tracker::new(load_gate.clone())),
        back: Rc::new(RefCell::new(ui::back::BackDispatcher::default())),
        settings: settings.clone(),
        load_gate,
    };

    // Register all scenes here
    let mut registry = SceneRegistry::new();
    registry.register(SPLASH_SCENE, |s| Box::new(SplashScene::new(s)));
    registry.register(MAIN_MENU_SCENE, |s| Box::new(MainMenuScene::new(s)));
    registry.register(SCAN_SCENE, |s| Box::new(ScanScene::new(s)));
    registry.register(WIKI_SCENE, |s| Box::new(WikiScene::new(s)));
    registry.register(MEMENTOS_SCENE, |s| Box::new(MementosScene::new(s)));
    registry.register(LOADING_SCENE, |s| Box::new(LoadingScene::new(s)));

    let mut stack = NavigationStack::new(registry, services.clone());

    // A saved (or forced) language skips the picker and boots straight into
    // the menu; first run starts at the splash scene.
    let saved = settings
        .borrow()
        .get(PREVIOUS_LANGUAGE_KEY)
        .map(str::to_string);
    let startup_lang = cli.lang.or(saved);
    match startup_lang {
        Some(lang) if localization.languages().contains(&lang) => {
            localization.change_language(&lang);
            stack.push(MAIN_MENU_SCENE, false, Payload::None);
        }
        other => {
            if let Some(lang) = other {
                log::error!("ignoring unknown startup language {lang:?}");
            }
            stack.push(SPLASH_SCENE, false, Payload::None);
        }
    }

    ui::runner::run(&mut stack, &services).await
}
