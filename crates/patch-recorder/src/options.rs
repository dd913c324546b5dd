//! Session configuration.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::patch::ItemId;
use crate::path::{Key, Path};
use crate::value::Value;

/// How patch paths are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathMode {
    /// Arrays of keys.
    #[default]
    Keys,
    /// RFC 6901 pointer strings.
    Pointer,
}

pub type Extractor = Rc<dyn Fn(&Value) -> Option<ItemId>>;

/// Where to find item ids, mirroring the shape of the data.
///
/// Nested levels are keyed by property name. Array indices are skipped
/// while walking, so an extractor registered for a list applies to every
/// element of it.
#[derive(Clone)]
pub enum ItemIdConfig {
    Extractor(Extractor),
    Nested(IndexMap<String, ItemIdConfig>),
}

impl ItemIdConfig {
    pub fn extractor<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<ItemId> + 'static,
    {
        ItemIdConfig::Extractor(Rc::new(f))
    }

    /// Extractor reading a string or number field of an object item.
    pub fn field(name: &str) -> Self {
        let name = name.to_string();
        Self::extractor(move |item| item.get(name.as_str()).and_then(|v| ItemId::from_value(&v)))
    }

    pub fn nested<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ItemIdConfig)>,
        K: Into<String>,
    {
        ItemIdConfig::Nested(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The extractor for items of the container at `container`, if any.
    pub(crate) fn lookup(&self, container: &Path) -> Option<&Extractor> {
        let mut node = self;
        for key in container.keys() {
            match key {
                Key::Number(_) => continue,
                Key::String(name) => match node {
                    ItemIdConfig::Nested(children) => node = children.get(name)?,
                    ItemIdConfig::Extractor(_) => return None,
                },
                Key::Symbol(_) | Key::Opaque(_) => return None,
            }
        }
        match node {
            ItemIdConfig::Extractor(f) => Some(f),
            ItemIdConfig::Nested(_) => None,
        }
    }
}

impl fmt::Debug for ItemIdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemIdConfig::Extractor(_) => f.write_str("Extractor(..)"),
            ItemIdConfig::Nested(children) => f.debug_map().entries(children.iter()).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// Report array shrinkage from `pop` and length writes as one
    /// `replace .../length` patch.
    pub report_shrink_as_length: bool,
    /// Condense the patch list before returning it.
    pub compress: bool,
    pub item_id: Option<ItemIdConfig>,
    pub path_mode: PathMode,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            report_shrink_as_length: true,
            compress: true,
            item_id: None,
            path_mode: PathMode::Keys,
        }
    }
}

impl RecordOptions {
    pub fn with_shrink_as_length(mut self, on: bool) -> Self {
        self.report_shrink_as_length = on;
        self
    }

    pub fn with_compress(mut self, on: bool) -> Self {
        self.compress = on;
        self
    }

    pub fn with_item_id(mut self, config: ItemIdConfig) -> Self {
        self.item_id = Some(config);
        self
    }

    pub fn with_path_mode(mut self, mode: PathMode) -> Self {
        self.path_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn lookup_skips_indices() {
        let config = ItemIdConfig::nested([(
            "lists",
            ItemIdConfig::nested([("todos", ItemIdConfig::field("id"))]),
        )]);
        assert!(config.lookup(&path!["lists", "todos"]).is_some());
        assert!(config.lookup(&path!["lists", 0, "todos"]).is_some());
        assert!(config.lookup(&path!["lists"]).is_none());
        assert!(config.lookup(&path!["lists", "todos", "x"]).is_none());
        assert!(config.lookup(&path!["other"]).is_none());
    }

    #[test]
    fn field_extractor_reads_ids() {
        let config = ItemIdConfig::field("id");
        let f = config.lookup(&Path::root()).unwrap();
        assert_eq!(f(&Value::object([("id", "a")])), Some(ItemId::from("a")));
        assert_eq!(f(&Value::object([("id", 7)])), Some(ItemId::from(7)));
        assert_eq!(f(&Value::object([("id", Value::Null)])), None);
        assert_eq!(f(&Value::from(3)), None);
    }

    #[test]
    fn defaults() {
        let opts = RecordOptions::default();
        assert!(opts.report_shrink_as_length);
        assert!(opts.compress);
        assert_eq!(opts.path_mode, PathMode::Keys);
        assert!(opts.item_id.is_none());
    }
}
