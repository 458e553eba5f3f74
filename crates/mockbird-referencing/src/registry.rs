//! The document registry: owns one immutable JSON document, its reference
//! graph, and a cache of schema handles keyed by canonical pointer.
use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use crate::{
    pointer,
    reference::{classify, RefTarget},
    Error, RefGraph,
};

/// A schema value together with its location and cycle status.
///
/// Handles are cheap to clone (`Arc` inside the registry cache) and identify
/// the schema by its canonical pointer, never by a heap address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSchema {
    raw: Value,
    pointer: String,
    is_cyclic: bool,
}

impl ProcessedSchema {
    /// The schema value: boolean or object.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }
    /// Canonical `#/…` pointer of this schema within the document.
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }
    /// Whether this location participates in a reference cycle.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        self.is_cyclic
    }
}

/// Owns a parsed document and resolves pointers, anchors, and `$id`s
/// against it.
///
/// The document and the reference graph are immutable after construction;
/// the only mutable state is the insertion-only handle cache, so sharing a
/// registry across threads for read operations is safe.
#[derive(Debug)]
pub struct Registry {
    document: Value,
    graph: RefGraph,
    cache: Mutex<AHashMap<String, Arc<ProcessedSchema>>>,
    anchors: OnceCell<AHashMap<String, String>>,
    ids: OnceCell<AHashMap<String, String>>,
    base_uri: Option<String>,
}

impl Registry {
    /// Build a registry; the reference graph is computed eagerly.
    #[must_use]
    pub fn new(document: Value) -> Registry {
        let graph = RefGraph::build(&document);
        if !graph.cycles().is_empty() {
            debug!(cycles = graph.cycles().len(), "document contains reference cycles");
        }
        Registry {
            document,
            graph,
            cache: Mutex::new(AHashMap::new()),
            anchors: OnceCell::new(),
            ids: OnceCell::new(),
            base_uri: None,
        }
    }

    /// Build a registry with a base URI recorded for diagnostics.
    #[must_use]
    pub fn with_base_uri(document: Value, base_uri: impl Into<String>) -> Registry {
        let mut registry = Registry::new(document);
        registry.base_uri = Some(base_uri.into());
        registry
    }

    /// The root document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The base URI supplied at construction, if any.
    #[must_use]
    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// The reference graph built at construction.
    #[must_use]
    pub fn ref_graph(&self) -> &RefGraph {
        &self.graph
    }

    /// Resolve a pointer to the value it addresses. Accepts `#`, the empty
    /// string, and percent-encoded fragments; returns `None` instead of
    /// failing.
    #[must_use]
    pub fn resolve(&self, pointer: &str) -> Option<&Value> {
        pointer::resolve(&self.document, pointer).ok()
    }

    /// Resolve a pointer to a schema handle.
    ///
    /// Returns `None` when the pointer does not resolve or the value there is
    /// not schema-shaped (only booleans and objects are schemas). Handles are
    /// cached for the registry's lifetime.
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<Arc<ProcessedSchema>> {
        let canonical = pointer::canonical(pointer).ok()?;
        if let Some(handle) = self.cache.lock().expect("cache lock").get(&canonical) {
            return Some(Arc::clone(handle));
        }
        let raw = pointer::resolve(&self.document, &canonical).ok()?;
        if !matches!(raw, Value::Bool(_) | Value::Object(_)) {
            return None;
        }
        let handle = Arc::new(ProcessedSchema {
            raw: raw.clone(),
            is_cyclic: self.graph.is_cyclic(&canonical),
            pointer: canonical.clone(),
        });
        // Concurrent inserts of the same pointer are idempotent.
        Some(Arc::clone(
            self.cache
                .lock()
                .expect("cache lock")
                .entry(canonical)
                .or_insert(handle),
        ))
    }

    /// Resolve a `$ref` string to a schema handle.
    ///
    /// Dispatches on the reference form: `#`/`#/…` as pointers, `#name` as an
    /// anchor search, bare strings as exact `$id` matches. External and
    /// malformed references yield `None`; use [`classify`] to obtain the
    /// structured error.
    #[must_use]
    pub fn resolve_ref(&self, reference: &str) -> Option<Arc<ProcessedSchema>> {
        match classify(reference).ok()? {
            RefTarget::Root => self.get("#"),
            RefTarget::Pointer(pointer) => self.get(&pointer),
            RefTarget::Anchor(name) => {
                let pointer = self.anchor_index().get(&name)?.clone();
                self.get(&pointer)
            }
            RefTarget::Id(id) => {
                let pointer = self.id_index().get(&id)?.clone();
                self.get(&pointer)
            }
            RefTarget::External { scheme, .. } => {
                debug!(reference, ?scheme, "external reference is not resolvable");
                None
            }
        }
    }

    /// Classify why a reference fails to resolve, as a structured error.
    ///
    /// Returns `None` for references that do resolve.
    #[must_use]
    pub fn resolution_error(&self, reference: &str) -> Option<Error> {
        match classify(reference) {
            Err(error) => Some(error),
            Ok(RefTarget::Root) => None,
            Ok(RefTarget::Pointer(pointer)) => match self.get(&pointer) {
                Some(_) => None,
                None => pointer::resolve(&self.document, &pointer)
                    .err()
                    .or_else(|| Some(Error::pointer_to_nowhere(pointer))),
            },
            Ok(RefTarget::Anchor(name)) => {
                if self.anchor_index().contains_key(&name) {
                    None
                } else {
                    Some(Error::no_such_anchor(name))
                }
            }
            Ok(RefTarget::Id(id)) => {
                if self.id_index().contains_key(&id) {
                    None
                } else {
                    Some(Error::no_such_id(id))
                }
            }
            Ok(RefTarget::External { scheme, host, path }) => {
                Some(Error::external_ref(reference, scheme, host, path))
            }
        }
    }

    /// Whether a reference participates in a cycle.
    #[must_use]
    pub fn is_cyclic(&self, reference: &str) -> bool {
        self.graph.is_cyclic(reference)
    }

    /// Named schemas under `#/components/schemas`, in name order.
    /// Empty for non-OpenAPI documents.
    #[must_use]
    pub fn component_schemas(&self) -> Vec<(String, Arc<ProcessedSchema>)> {
        let Some(Value::Object(schemas)) = self.resolve("#/components/schemas") else {
            return Vec::new();
        };
        schemas
            .keys()
            .filter_map(|name| {
                let pointer = format!("#/components/schemas/{}", pointer::escape(name));
                self.get(&pointer).map(|handle| (name.clone(), handle))
            })
            .collect()
    }

    /// Anchor name → canonical pointer, built on first use.
    fn anchor_index(&self) -> &AHashMap<String, String> {
        self.anchors
            .get_or_init(|| self.keyword_index("$anchor"))
    }

    /// `$id` string → canonical pointer, built on first use. Exact match
    /// only; no basename or suffix matching.
    fn id_index(&self) -> &AHashMap<String, String> {
        self.ids.get_or_init(|| self.keyword_index("$id"))
    }

    fn keyword_index(&self, keyword: &str) -> AHashMap<String, String> {
        // Sorted walk so that duplicate declarations resolve to the
        // lexicographically first pointer on every run.
        let mut pointers: Vec<&String> = self.graph.pointers().iter().collect();
        pointers.sort_unstable();
        let mut index = AHashMap::new();
        for pointer in pointers {
            let Some(Value::Object(object)) = self.resolve(pointer) else {
                continue;
            };
            if let Some(Value::String(name)) = object.get(keyword) {
                index
                    .entry(name.clone())
                    .or_insert_with(|| pointer.clone());
            }
        }
        index
    }
}
