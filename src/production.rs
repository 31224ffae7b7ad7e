//! Context-sensitive rewrite rules.
//!
//! A production names the module kind it rewrites, optional left/right
//! context kinds, a gating condition, a stochastic acceptance test, and a
//! successor builder. Productions are immutable once constructed; matching
//! is a pure read of the sequence and acceptance draws only from the
//! injected random source.
//!
//! # Citations
//! - Context-sensitive and parametric grammars: Prusinkiewicz & Lindenmayer,
//!   "The Algorithmic Beauty of Plants", Chapter 1 (1990)
//! - Parametric L-systems: Hanan, "Parametric L-systems and their
//!   application to the modelling and visualization of plants" (1992)

use crate::module::ModuleKind;
use crate::node::Node;
use crate::random::RandomSource;

/// Read-only view of a match site: the node under the cursor and its
/// immediate siblings at the same nesting depth.
///
/// Neighbors never cross into or out of a branch; a branched sub-sequence is
/// invisible to the context of the level above it, and vice versa.
pub struct MatchWindow<'a, S> {
    /// Previous sibling, if any.
    pub left: Option<&'a Node<S>>,
    /// The node the production would rewrite.
    pub node: &'a Node<S>,
    /// Next sibling, if any.
    pub right: Option<&'a Node<S>>,
}

type ConditionFn<S> = Box<dyn for<'a> Fn(&MatchWindow<'a, S>) -> bool>;
type ProbabilityFn<S> = Box<dyn for<'a> Fn(&MatchWindow<'a, S>, &mut dyn RandomSource) -> bool>;
type BuildFn<S> = Box<dyn for<'a> Fn(u64, &MatchWindow<'a, S>) -> Vec<Node<S>>>;

/// An immutable context-sensitive rewrite rule.
///
/// Built with [`Production::new`] plus the chainable `with_*` refinements.
/// The condition and probability default to always-true; the context kinds
/// default to unconstrained.
pub struct Production<S> {
    predecessor: ModuleKind,
    left_context: Option<ModuleKind>,
    right_context: Option<ModuleKind>,
    condition: ConditionFn<S>,
    probability: ProbabilityFn<S>,
    build: BuildFn<S>,
}

impl<S> Production<S> {
    /// Creates a rule rewriting `predecessor` nodes via `build`.
    ///
    /// `build` receives the running generation and the matched window and
    /// returns the ordered (possibly empty) replacement list. Every returned
    /// node, including nodes inside returned branches, must be stamped with
    /// the passed generation.
    pub fn new<F>(predecessor: ModuleKind, build: F) -> Self
    where
        F: for<'a> Fn(u64, &MatchWindow<'a, S>) -> Vec<Node<S>> + 'static,
    {
        Self {
            predecessor,
            left_context: None,
            right_context: None,
            condition: Box::new(|_| true),
            probability: Box::new(|_, _| true),
            build: Box::new(build),
        }
    }

    /// Requires the previous sibling to carry `kind`.
    pub fn with_left_context(mut self, kind: ModuleKind) -> Self {
        self.left_context = Some(kind);
        self
    }

    /// Requires the next sibling to carry `kind`.
    pub fn with_right_context(mut self, kind: ModuleKind) -> Self {
        self.right_context = Some(kind);
        self
    }

    /// Gates the rule on a pure read of the matched window.
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: for<'a> Fn(&MatchWindow<'a, S>) -> bool + 'static,
    {
        self.condition = Box::new(condition);
        self
    }

    /// Gates the rule on a stochastic acceptance test.
    ///
    /// The test draws from the random source injected by the owning
    /// derivation sequence; compare a draw against a threshold to accept
    /// with that probability.
    pub fn with_probability<F>(mut self, probability: F) -> Self
    where
        F: for<'a> Fn(&MatchWindow<'a, S>, &mut dyn RandomSource) -> bool + 'static,
    {
        self.probability = Box::new(probability);
        self
    }

    /// Kind this rule rewrites.
    #[inline]
    pub fn predecessor(&self) -> ModuleKind {
        self.predecessor
    }

    /// Required kind of the previous sibling, if constrained.
    #[inline]
    pub fn left_context(&self) -> Option<ModuleKind> {
        self.left_context
    }

    /// Required kind of the next sibling, if constrained.
    #[inline]
    pub fn right_context(&self) -> Option<ModuleKind> {
        self.right_context
    }

    /// Attempts to match this rule at a window and, on success, builds the
    /// replacement list.
    ///
    /// Returns `None` on any failed test; a failed match is normal control
    /// flow, not an error. The tests run in order:
    ///
    /// 1. nodes stamped with the running `generation` never match (each
    ///    generation rewrites an original node at most once);
    /// 2. the node's kind must equal the predecessor kind exactly;
    /// 3. a constrained left context fails when there is no previous sibling
    ///    or its kind differs; symmetrically for the right context;
    /// 4. the condition, then the probability test.
    pub fn try_match(
        &self,
        generation: u64,
        window: &MatchWindow<'_, S>,
        random: &mut dyn RandomSource,
    ) -> Option<Vec<Node<S>>> {
        if window.node.created_generation() == generation {
            return None;
        }
        if window.node.kind() != self.predecessor {
            return None;
        }
        if let Some(required) = self.left_context {
            match window.left {
                Some(left) if left.kind() == required => {}
                _ => return None,
            }
        }
        if let Some(required) = self.right_context {
            match window.right {
                Some(right) if right.kind() == required => {}
                _ => return None,
            }
        }
        if !(self.condition)(window) {
            return None;
        }
        if !(self.probability)(window, random) {
            return None;
        }
        Some((self.build)(generation, window))
    }
}

impl<S> std::fmt::Debug for Production<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Production")
            .field("predecessor", &self.predecessor)
            .field("left_context", &self.left_context)
            .field("right_context", &self.right_context)
            .finish()
    }
}
