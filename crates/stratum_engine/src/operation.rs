use stratum_reflect::ClassDecl;

// -----------------------------------------------------------------------------
// Operation

/// An endpoint-like abstraction supplied by the host: a target entity type
/// plus the visibility groups permitted for that use case.
///
/// The engine only reads an operation, to derive a per-call
/// [`Context`](crate::Context), and never mutates it. An operation with an
/// empty group list places no visibility restriction on the call.
pub trait Operation {
    /// The declaration of the entity type this operation works on.
    fn target(&self) -> &'static ClassDecl;

    /// The visibility groups this operation exposes.
    fn groups(&self) -> Vec<String>;
}

/// A plain-data [`Operation`], sufficient for hosts that configure
/// operations statically.
pub struct StaticOperation {
    target: &'static ClassDecl,
    groups: Vec<String>,
}

impl StaticOperation {
    pub fn new(target: &'static ClassDecl) -> Self {
        Self {
            target,
            groups: Vec::new(),
        }
    }

    pub fn with_groups<I, S>(target: &'static ClassDecl, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target,
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }
}

impl Operation for StaticOperation {
    fn target(&self) -> &'static ClassDecl {
        self.target
    }

    fn groups(&self) -> Vec<String> {
        self.groups.clone()
    }
}
