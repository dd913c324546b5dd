//! Recording sessions.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::compress::compress;
use crate::draft::{Draft, Drafted};
use crate::error::{RecordError, RecordResult};
use crate::options::{PathMode, RecordOptions};
use crate::patch::Patch;
use crate::path::Path;
use crate::value::{MapKey, MapRef, NodeId, Value};

/// State shared by every draft of one recording call.
pub(crate) struct Session {
    pub(crate) options: RecordOptions,
    pub(crate) patches: RefCell<Vec<Patch>>,
    /// One draft per node and path, so handles stay identical across reads.
    drafts: RefCell<HashMap<(NodeId, Path), Draft>>,
    /// Keys each map held when the session first reached it.
    map_keys: RefCell<HashMap<NodeId, (MapRef, HashSet<MapKey>)>>,
    revoked: Cell<bool>,
}

impl Session {
    pub(crate) fn new(options: RecordOptions) -> Self {
        Session {
            options,
            patches: RefCell::new(Vec::new()),
            drafts: RefCell::new(HashMap::new()),
            map_keys: RefCell::new(HashMap::new()),
            revoked: Cell::new(false),
        }
    }

    pub(crate) fn ensure_live(&self) -> RecordResult<()> {
        if self.revoked.get() {
            Err(RecordError::Revoked)
        } else {
            Ok(())
        }
    }

    /// Draft for a container at `path`, or `None` for primitives.
    ///
    /// The same node reached through another path (or after an index shift)
    /// gets a draft of its own.
    pub(crate) fn draft_for(self: &Rc<Self>, value: &Value, path: Path) -> Option<Draft> {
        let id = value.node_id()?;
        let cache_key = (id, path);
        if let Some(draft) = self.drafts.borrow().get(&cache_key) {
            return Some(draft.clone());
        }
        let (id, path) = cache_key;
        if let Value::Map(map) = value {
            self.map_keys.borrow_mut().entry(id).or_insert_with(|| {
                let keys = map.borrow().entries.keys().cloned().collect();
                (map.clone(), keys)
            });
        }
        let draft = Draft::bind(value, path.clone(), Rc::clone(self))?;
        self.drafts.borrow_mut().insert((id, path), draft.clone());
        Some(draft)
    }

    pub(crate) fn drafted(self: &Rc<Self>, value: Value, path: Path) -> Drafted {
        match self.draft_for(&value, path.clone()) {
            Some(draft) => Drafted::Draft(draft),
            None => Drafted::Primitive { value, path },
        }
    }

    /// Whether `map` held `key` before this session first touched it.
    pub(crate) fn map_had_key(&self, map: &MapRef, key: &Value) -> bool {
        self.map_keys
            .borrow()
            .get(&map.id())
            .is_some_and(|(_, keys)| keys.contains(&MapKey(key.clone())))
    }

    /// Revokes every draft and hands back the raw patch list.
    fn finish(&self) -> Vec<Patch> {
        self.revoked.set(true);
        // Drafts hold the session; dropping the cache breaks the cycle.
        self.drafts.borrow_mut().clear();
        self.map_keys.borrow_mut().clear();
        self.patches.take()
    }
}

/// Records the patches `mutate` produces on `root`, with default options.
///
/// ```
/// use patch_recorder::{path, record, Patch, Value};
///
/// let state = Value::object([("items", Value::array([1, 2, 3]))]);
/// let patches = record(&state, |draft| {
///     draft.get("items")?.as_array()?.push([4])?;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(patches, vec![Patch::add(path!["items", 3], 4)]);
/// assert_eq!(state.get("items"), Some(Value::array([1, 2, 3, 4])));
/// ```
pub fn record<F>(root: &Value, mutate: F) -> RecordResult<Vec<Patch>>
where
    F: FnOnce(&Draft) -> RecordResult<()>,
{
    record_with(root, &RecordOptions::default(), mutate)
}

/// Records the patches `mutate` produces on `root`.
///
/// `root` is changed in place. If `mutate` fails, the error is returned and
/// no patches are produced; writes made before the failure stay in `root`.
pub fn record_with<F>(root: &Value, options: &RecordOptions, mutate: F) -> RecordResult<Vec<Patch>>
where
    F: FnOnce(&Draft) -> RecordResult<()>,
{
    let session = Rc::new(Session::new(options.clone()));
    let Some(draft) = session.draft_for(root, Path::root()) else {
        return Err(RecordError::NotAContainer {
            path: Path::root(),
            found: root.kind(),
        });
    };
    debug!(kind = root.kind(), compress = options.compress, "recording started");

    let outcome = mutate(&draft);
    let patches = session.finish();
    if let Err(err) = outcome {
        debug!(error = %err, discarded = patches.len(), "recording aborted");
        return Err(err);
    }

    let raw = patches.len();
    let mut patches = if options.compress {
        compress(patches)
    } else {
        patches
    };
    if options.path_mode == PathMode::Pointer {
        patches = patches.into_iter().map(Patch::into_pointer).collect();
    }
    debug!(raw, emitted = patches.len(), "recording finished");
    Ok(patches)
}
