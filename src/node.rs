//! Sequence element: one module instance plus its optional branch.

use crate::chain::Chain;
use crate::module::{Module, ModuleKind};
use std::fmt;

/// A branch hanging off a node: an ordered sub-sequence of nodes.
pub type Branch<S> = Chain<Node<S>>;

/// One element of a derivation sequence.
///
/// A node owns its module instance outright and remembers the generation it
/// was created in. The generation stamp is set at construction and never
/// mutated; rewriting skips nodes stamped with the running generation, which
/// is what bounds every generation pass to one rewrite attempt per original
/// node.
///
/// A branch, if present, is exclusively owned by its node. There is no
/// sharing and no back-reference to the parent, so the structure is a pure
/// tree.
pub struct Node<S> {
    module: Box<dyn Module<S>>,
    created_generation: u64,
    branch: Option<Branch<S>>,
}

impl<S> Node<S> {
    /// Creates a node without a branch.
    pub fn new<M>(generation: u64, module: M) -> Self
    where
        M: Module<S> + 'static,
    {
        Self {
            module: Box::new(module),
            created_generation: generation,
            branch: None,
        }
    }

    /// Creates a node carrying a branch.
    pub fn with_branch<M>(generation: u64, module: M, branch: Branch<S>) -> Self
    where
        M: Module<S> + 'static,
    {
        Self {
            module: Box::new(module),
            created_generation: generation,
            branch: Some(branch),
        }
    }

    /// Identity tag of the carried module.
    #[inline]
    pub fn kind(&self) -> ModuleKind {
        self.module.kind()
    }

    /// Generation this node was created in.
    #[inline]
    pub fn created_generation(&self) -> u64 {
        self.created_generation
    }

    /// Shared view of the carried module.
    #[inline]
    pub fn module(&self) -> &dyn Module<S> {
        self.module.as_ref()
    }

    /// Mutable view of the carried module.
    #[inline]
    pub fn module_mut(&mut self) -> &mut dyn Module<S> {
        self.module.as_mut()
    }

    /// Downcasts the carried module to its concrete type.
    pub fn module_as<M>(&self) -> Option<&M>
    where
        M: Module<S> + 'static,
    {
        self.module.as_any().downcast_ref::<M>()
    }

    /// Shared view of the branch, if any.
    #[inline]
    pub fn branch(&self) -> Option<&Branch<S>> {
        self.branch.as_ref()
    }

    /// Mutable view of the branch, if any.
    #[inline]
    pub fn branch_mut(&mut self) -> Option<&mut Branch<S>> {
        self.branch.as_mut()
    }

    /// Returns `true` when this node carries a branch.
    #[inline]
    pub fn has_branch(&self) -> bool {
        self.branch.is_some()
    }
}

impl<S> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.module.kind())
            .field("created_generation", &self.created_generation)
            .field("branch_len", &self.branch.as_ref().map(Chain::len))
            .finish()
    }
}
