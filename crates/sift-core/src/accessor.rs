//! Host-supplied item accessors
//!
//! The controller never inspects item payloads structurally. Everything it
//! needs — searchable text, stable identity, optional group key — comes
//! through [`ItemAccessors`], bound once at construction. This replaces any
//! reflective field access with explicit, typed extractor functions.

/// Accessor bundle for an opaque item type `T` with identity type `K`.
pub struct ItemAccessors<T, K> {
    id: Box<dyn Fn(&T) -> K>,
    text: Box<dyn Fn(&T) -> Vec<String>>,
    group_key: Option<Box<dyn Fn(&T) -> String>>,
}

impl<T, K> ItemAccessors<T, K> {
    /// Create accessors from an identity extractor and a searchable-text
    /// extractor. Text extraction may return multiple fields; matching picks
    /// the best-scoring one.
    pub fn new(
        id: impl Fn(&T) -> K + 'static,
        text: impl Fn(&T) -> Vec<String> + 'static,
    ) -> Self {
        Self {
            id: Box::new(id),
            text: Box::new(text),
            group_key: None,
        }
    }

    /// Attach a group-key extractor, enabling grouped results.
    #[must_use]
    pub fn with_group_key(mut self, group_key: impl Fn(&T) -> String + 'static) -> Self {
        self.group_key = Some(Box::new(group_key));
        self
    }

    /// Stable identity of `item`.
    #[must_use]
    pub fn id_of(&self, item: &T) -> K {
        (self.id)(item)
    }

    /// Searchable text fields of `item`.
    #[must_use]
    pub fn texts_of(&self, item: &T) -> Vec<String> {
        (self.text)(item)
    }

    /// Group key of `item`, if grouping is configured.
    #[must_use]
    pub fn group_of(&self, item: &T) -> Option<String> {
        self.group_key.as_ref().map(|f| f(item))
    }

    /// Whether a group-key extractor was supplied.
    #[must_use]
    pub const fn has_grouping(&self) -> bool {
        self.group_key.is_some()
    }

    /// The group-key extractor, if any.
    #[must_use]
    pub(crate) fn group_fn(&self) -> Option<&dyn Fn(&T) -> String> {
        self.group_key.as_deref()
    }
}

impl<T, K> std::fmt::Debug for ItemAccessors<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemAccessors")
            .field("has_grouping", &self.has_grouping())
            .finish_non_exhaustive()
    }
}
