pub mod localization;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::settings::{SettingsStore, SAVED_MEMENTOS_KEY};

/// A collectible keepsake attached to an exhibit, unlocked by scanning it.
#[derive(Debug, Clone, Deserialize)]
pub struct Memento {
    pub id: String,
    pub title: String,
    pub info: String,
}

/// A single exhibit in the guide.
#[derive(Debug, Clone, Deserialize)]
pub struct Exhibit {
    pub id: String,
    pub title: String,
    pub info: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub mementos: Vec<Memento>,
}

#[derive(Deserialize)]
struct ContentFile {
    exhibits: Vec<Exhibit>,
}

/// Read-only exhibit catalogue plus the user's unlocked-memento set.
///
/// The catalogue itself is embedded at build time; only the unlocked set is
/// mutable, and it is mirrored to the settings store on every change.
pub struct ContentLibrary {
    exhibits: Vec<Exhibit>,
    unlocked: RefCell<BTreeSet<String>>,
    settings: Rc<RefCell<SettingsStore>>,
}

impl ContentLibrary {
    pub fn from_embedded(settings: Rc<RefCell<SettingsStore>>) -> Result<Self> {
        Self::from_json(include_str!("../../assets/content.json"), settings)
    }

    pub fn from_json(raw: &str, settings: Rc<RefCell<SettingsStore>>) -> Result<Self> {
        let file: ContentFile =
            serde_json::from_str(raw).context("malformed exhibit content file")?;

        let unlocked = match settings.borrow().get(SAVED_MEMENTOS_KEY) {
            Some(saved) => serde_json::from_str::<BTreeSet<String>>(saved).unwrap_or_else(|err| {
                log::error!("discarding unreadable saved mementos: {err}");
                BTreeSet::new()
            }),
            None => BTreeSet::new(),
        };

        Ok(Self {
            exhibits: file.exhibits,
            unlocked: RefCell::new(unlocked),
            settings,
        })
    }

    pub fn exhibits(&self) -> &[Exhibit] {
        &self.exhibits
    }

    pub fn exhibit_count(&self) -> usize {
        self.exhibits.len()
    }

    /// Look up an exhibit by id. Callers are expected to log and degrade when
    /// the id is unknown; a missing exhibit never aborts navigation.
    pub fn exhibit(&self, id: &str) -> Option<&Exhibit> {
        self.exhibits.iter().find(|e| e.id == id)
    }

    /// Unlock every memento attached to the given exhibit and persist the set.
    pub fn unlock_associated_mementos(&self, exhibit: &Exhibit) {
        let mut unlocked = self.unlocked.borrow_mut();
        let before = unlocked.len();
        for memento in &exhibit.mementos {
            unlocked.insert(memento.id.clone());
        }
        if unlocked.len() != before {
            log::info!(
                "unlocked {} memento(s) for exhibit {}",
                unlocked.len() - before,
                exhibit.id
            );
            let encoded = serde_json::to_string(&*unlocked).unwrap_or_default();
            self.settings
                .borrow_mut()
                .set(SAVED_MEMENTOS_KEY, encoded);
        }
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.borrow().len()
    }

    /// The unlocked mementos, in catalogue order.
    pub fn unlocked_mementos(&self) -> Vec<Memento> {
        let unlocked = self.unlocked.borrow();
        self.exhibits
            .iter()
            .flat_map(|e| e.mementos.iter())
            .filter(|m| unlocked.contains(&m.id))
            .cloned()
            .collect()
    }
}
