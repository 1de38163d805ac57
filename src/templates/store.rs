//! Template lookup: schedule templates keyed by courts/duration/players/type
//! (e.g. `2C2H10P-T`).

use crate::templates::Template;
use std::collections::HashMap;
use std::path::PathBuf;

/// Collaborator interface resolving a declarative schedule template for a
/// session configuration. Returns `None` when no template matches the key.
pub trait TemplateStore {
    fn load_template(&self, key: &str) -> Option<Template>;
}

/// Template store backed by a map (tests, embedded templates).
#[derive(Clone, Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: HashMap<String, Template>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, template: Template) {
        self.templates.insert(key.into(), template);
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn load_template(&self, key: &str) -> Option<Template> {
        self.templates.get(key).cloned()
    }
}

/// Template store reading `<key>.json` files from a directory.
#[derive(Clone, Debug)]
pub struct DirTemplateStore {
    dir: PathBuf,
}

impl DirTemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateStore for DirTemplateStore {
    fn load_template(&self, key: &str) -> Option<Template> {
        let path = self.dir.join(format!("{key}.json"));
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return None,
        };
        match serde_json::from_str(&contents) {
            Ok(template) => Some(template),
            Err(e) => {
                log::warn!("Ignoring malformed template {}: {}", path.display(), e);
                None
            }
        }
    }
}
