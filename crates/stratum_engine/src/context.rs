use std::collections::BTreeSet;

use stratum_reflect::Facet;

use crate::operation::Operation;

// -----------------------------------------------------------------------------
// Context

/// Per-call configuration: the active visibility-group set, the null policy,
/// and (for deserialization) an optional merge target.
///
/// A context never mutates metadata; it only filters which resolved
/// properties a traversal touches. Each call gets its own context; contexts
/// are never shared across concurrent calls.
///
/// # Examples
///
/// ```
/// use stratum_engine::Context;
///
/// let ctx = Context::new().group("list").serialize_null(true);
/// assert!(ctx.allows(&["list", "detail"]));
/// assert!(!ctx.allows(&["admin"]));
/// // A field with no groups is always visible.
/// assert!(ctx.allows(&[]));
/// ```
#[derive(Debug, Default)]
pub struct Context {
    groups: BTreeSet<String>,
    serialize_null: bool,
    target: Option<Box<dyn Facet>>,
}

impl Context {
    /// Creates an unrestricted context: no groups, nulls omitted, no target.
    pub fn new() -> Self {
        Self::default()
    }

    /// The serialization context for an operation: the operation's groups
    /// when it declares any, with explicit nulls enabled.
    pub fn for_operation(operation: &dyn Operation) -> Self {
        Self::new().serialize_null(true).groups(operation.groups())
    }

    /// The deserialization context for an operation: the operation's groups
    /// when it declares any.
    pub fn for_operation_deserialize(operation: &dyn Operation) -> Self {
        Self::new().groups(operation.groups())
    }

    /// Adds a single active visibility group.
    pub fn group(mut self, label: impl Into<String>) -> Self {
        self.groups.insert(label.into());
        self
    }

    /// Adds all given visibility groups.
    pub fn groups<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Sets whether null-valued visible fields are emitted as explicit JSON
    /// nulls (`true`) or omitted entirely (`false`, the default).
    pub fn serialize_null(mut self, emit: bool) -> Self {
        self.serialize_null = emit;
        self
    }

    /// Supplies an existing object for merge deserialization: incoming
    /// fields are written into it and fields absent from the input keep
    /// their current values.
    pub fn target(mut self, target: Box<dyn Facet>) -> Self {
        self.target = Some(target);
        self
    }

    /// The active visibility groups. Empty means "no restriction".
    pub fn active_groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    /// Whether explicit nulls are emitted.
    pub fn emits_null(&self) -> bool {
        self.serialize_null
    }

    /// The inclusion rule: a property with group labels `groups` is visible
    /// iff its set is empty, this context's set is empty, or the two
    /// intersect.
    pub fn allows(&self, groups: &[&str]) -> bool {
        groups.is_empty()
            || self.groups.is_empty()
            || groups.iter().any(|label| self.groups.contains(*label))
    }

    pub(crate) fn take_target(&mut self) -> Option<Box<dyn Facet>> {
        self.target.take()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Context;

    #[test]
    fn empty_context_allows_everything() {
        let ctx = Context::new();
        assert!(ctx.allows(&[]));
        assert!(ctx.allows(&["list"]));
        assert!(ctx.allows(&["detail", "admin"]));
    }

    #[test]
    fn grouped_context_requires_intersection() {
        let ctx = Context::new().group("list");
        assert!(ctx.allows(&[]));
        assert!(ctx.allows(&["list"]));
        assert!(ctx.allows(&["detail", "list"]));
        assert!(!ctx.allows(&["detail"]));
    }

    #[test]
    fn target_is_taken_once() {
        let mut ctx = Context::new().target(Box::new(7_u32));
        let target = ctx.take_target().unwrap();
        assert_eq!(target.take::<u32>().unwrap(), 7);
        assert!(ctx.take_target().is_none());
    }
}
