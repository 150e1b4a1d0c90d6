//! Embedded language packs and runtime language switching.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::event::{ListenerHandle, ListenerHub};

#[derive(Debug, Deserialize)]
pub struct LanguagePack {
    pub id: String,
    pub name: String,
    dict: HashMap<String, String>,
}

pub struct Localization {
    tables: HashMap<String, LanguagePack>,
    current: RefCell<Option<String>>,
    changed: ListenerHub<String>,
}

impl Localization {
    pub fn from_embedded() -> Result<Self> {
        Self::from_packs(&[
            include_str!("../../assets/lang/en.json"),
            include_str!("../../assets/lang/fr.json"),
        ])
    }

    pub fn from_packs(raw: &[&str]) -> Result<Self> {
        let mut tables = HashMap::new();
        for pack in raw {
            let pack: LanguagePack =
                serde_json::from_str(pack).context("malformed language pack")?;
            tables.insert(pack.id.clone(), pack);
        }
        Ok(Self {
            tables,
            current: RefCell::new(None),
            changed: ListenerHub::new(),
        })
    }

    /// Available language ids, sorted for stable menu order.
    pub fn languages(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tables.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// `(id, native name)` pairs for the language picker, sorted by id.
    pub fn language_entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .tables
            .values()
            .map(|pack| (pack.id.clone(), pack.name.clone()))
            .collect();
        entries.sort();
        entries
    }

    pub fn current_language(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Switch the active language and notify listeners. Unknown ids are
    /// logged and ignored so a stale saved preference cannot wedge startup.
    pub fn change_language(&self, id: &str) {
        if !self.tables.contains_key(id) {
            log::error!("unknown language {id:?}, keeping current");
            return;
        }
        *self.current.borrow_mut() = Some(id.to_string());
        self.changed.emit(&id.to_string());
    }

    /// Look up a display string in the active language. Missing keys are
    /// logged and echoed back so the UI shows *something* identifiable.
    pub fn text(&self, key: &str) -> String {
        let current = self.current.borrow();
        let Some(lang) = current.as_deref() else {
            log::error!("text lookup for {key:?} before a language was chosen");
            return key.to_string();
        };
        self.text_in(lang, key)
    }

    /// Like [`text`](Self::text) but against an explicit language, for the
    /// picker where no language is active yet.
    pub fn text_in(&self, lang: &str, key: &str) -> String {
        match self.tables.get(lang).and_then(|pack| pack.dict.get(key)) {
            Some(value) => value.clone(),
            None => {
                log::error!("missing localization key {key:?} in language {lang:?}");
                key.to_string()
            }
        }
    }

    pub fn on_language_changed<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&String) + 'static,
    {
        self.changed.subscribe(listener)
    }
}
