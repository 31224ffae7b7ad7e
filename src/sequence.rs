//! The derivation sequence and its generation-by-generation rewrite pass.
//!
//! A [`DerivationSequence`] owns the ordered node sequence, the registered
//! productions, the generation counter, and the injected random source.
//! Rewriting edits the sequence in place under its own iteration, which the
//! stable cursors of [`Chain`] make safe.
//!
//! # Determinism
//! Rewriting and evaluation are synchronous, single-owner operations. The
//! only source of non-determinism is the random source consulted by
//! probability tests; seed it explicitly and a derivation replays exactly.

use crate::chain::Chain;
use crate::node::Node;
use crate::production::{MatchWindow, Production};
use crate::random::{RandomSource, RngSource};
use crate::state::{thread_state, StateFork, SystemState};
use std::fmt;
use tracing::{debug, trace};

/// Usage and contract violations surfaced by the engine.
///
/// Failed matches are never errors; these variants all indicate a bug in the
/// embedding code and abort the operation that detected them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The axiom was empty at construction.
    EmptyAxiom,
    /// A successor builder returned a node (or a branch node) stamped with a
    /// generation other than the running one.
    GenerationStamp {
        /// The running generation the node should carry.
        expected: u64,
        /// The stamp the builder actually produced.
        found: u64,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyAxiom => write!(f, "axiom must contain at least one node"),
            EngineError::GenerationStamp { expected, found } => write!(
                f,
                "successor builder stamped a node with generation {} during generation {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for EngineError {}

/// An ordered, branching sequence of modules rewritten by productions.
///
/// Construct from an axiom and a production list, call
/// [`advance_generation`](Self::advance_generation) to derive, and
/// [`evaluate`](Self::evaluate) (or
/// [`evaluate_with`](Self::evaluate_with)) to thread a state value through
/// the result.
///
/// # Invariants
/// - The sequence is always in left-to-right derivation order; a generation
///   pass may grow or shrink it but never reorders nodes it did not rewrite.
/// - The generation counter starts at 0 and increments once per
///   [`advance_generation`](Self::advance_generation) call.
/// - Replacement nodes carry the running generation as their stamp and are
///   therefore exempt from rewriting until the next generation.
pub struct DerivationSequence<S> {
    sequence: Chain<Node<S>>,
    productions: Vec<Production<S>>,
    generation: u64,
    random: Box<dyn RandomSource>,
}

impl<S> DerivationSequence<S> {
    /// Creates a derivation sequence with a fixed-seed default random
    /// source, so stochastic grammars replay identically run to run.
    ///
    /// Returns [`EngineError::EmptyAxiom`] when `axiom` holds no nodes. An
    /// empty production list is allowed; the sequence then never changes.
    pub fn new(
        axiom: Vec<Node<S>>,
        productions: Vec<Production<S>>,
    ) -> Result<Self, EngineError> {
        Self::with_random_source(axiom, productions, RngSource::seeded(0))
    }

    /// Creates a derivation sequence drawing from `random` for every
    /// probability test.
    pub fn with_random_source<R>(
        axiom: Vec<Node<S>>,
        productions: Vec<Production<S>>,
        random: R,
    ) -> Result<Self, EngineError>
    where
        R: RandomSource + 'static,
    {
        if axiom.is_empty() {
            return Err(EngineError::EmptyAxiom);
        }
        Ok(Self {
            sequence: axiom.into_iter().collect(),
            productions,
            generation: 0,
            random: Box::new(random),
        })
    }

    /// Current generation counter (0 before any derivation).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of nodes at the top level of the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` when the sequence has been rewritten to nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Read-only view of the node sequence.
    #[inline]
    pub fn sequence(&self) -> &Chain<Node<S>> {
        &self.sequence
    }

    /// The registered productions, in registration order.
    #[inline]
    pub fn productions(&self) -> &[Production<S>] {
        &self.productions
    }

    /// Advances the derivation by one generation.
    ///
    /// Increments the generation counter, then gives each production in
    /// registration order one full front-to-back pass over the sequence as
    /// it stands at the start of that production's turn. At each node:
    ///
    /// - nodes stamped with the running generation are skipped, so nothing
    ///   created during this pass is rewritten again within it;
    /// - on a match, the replacement nodes are spliced in immediately before
    ///   the matched node (their relative order preserved), the matched node
    ///   is removed, and scanning resumes from the node just before the
    ///   inserted block — from the sequence head when there is none — so the
    ///   inserted nodes are visited (and skipped by their stamp) and can
    ///   serve as context for the nodes after them;
    /// - on no match, the cursor moves to the next node.
    ///
    /// The first production to match a node rewrites it; the node is gone
    /// before later productions take their turn.
    ///
    /// # Errors
    /// [`EngineError::GenerationStamp`] when a builder returns a node (or a
    /// branch node, recursively) not stamped with the running generation.
    /// The pass stops at the offending rule; this is a bug in the embedding
    /// code, not a recoverable condition.
    pub fn advance_generation(&mut self) -> Result<(), EngineError> {
        self.generation += 1;
        let generation = self.generation;
        for (index, production) in self.productions.iter().enumerate() {
            let mut rewrites = 0usize;
            let mut cursor = self.sequence.head();
            while let Some(current) = cursor {
                let matched = {
                    let left = self
                        .sequence
                        .prev(current)
                        .and_then(|id| self.sequence.get(id));
                    let right = self
                        .sequence
                        .next(current)
                        .and_then(|id| self.sequence.get(id));
                    match self.sequence.get(current) {
                        Some(node) => {
                            let window = MatchWindow { left, node, right };
                            production.try_match(generation, &window, &mut *self.random)
                        }
                        None => None,
                    }
                };
                match matched {
                    None => cursor = self.sequence.next(current),
                    Some(replacements) => {
                        for replacement in &replacements {
                            Self::check_generation_stamp(replacement, generation)?;
                        }
                        let anchor = self.sequence.prev(current);
                        for replacement in replacements {
                            let _ = self.sequence.insert_before(current, replacement);
                        }
                        self.sequence.remove(current);
                        rewrites += 1;
                        cursor = match anchor {
                            Some(before) => self.sequence.next(before),
                            None => self.sequence.head(),
                        };
                    }
                }
            }
            trace!(generation, production = index, rewrites, "production pass complete");
        }
        debug!(
            generation,
            length = self.sequence.len(),
            "generation advanced"
        );
        Ok(())
    }

    /// Verifies that a replacement node and its whole branch carry the
    /// running generation as their stamp.
    fn check_generation_stamp(node: &Node<S>, generation: u64) -> Result<(), EngineError> {
        if node.created_generation() != generation {
            return Err(EngineError::GenerationStamp {
                expected: generation,
                found: node.created_generation(),
            });
        }
        if let Some(branch) = node.branch() {
            for child in branch {
                Self::check_generation_stamp(child, generation)?;
            }
        }
        Ok(())
    }

    /// Evaluates the sequence from the default initial state.
    ///
    /// Equivalent to [`evaluate_with`](Self::evaluate_with) with
    /// `S::default()`.
    pub fn evaluate(&mut self) -> &Chain<Node<S>>
    where
        S: StateFork + Default,
    {
        let initial = S::default();
        self.evaluate_with(&initial)
    }

    /// Threads a state value through the sequence and returns the sequence
    /// for inspection.
    ///
    /// The initial value is forked on entry, so the caller's value is left
    /// alone by deep-copying payloads (handle payloads alias; see
    /// [`StateFork`]). Each branch descends with a further fork taken at
    /// its point of entry. Evaluation mutates only module payloads and the
    /// transient state: the sequence structure is untouched, and repeated
    /// evaluation from equal initial values reproduces the same query
    /// observations.
    pub fn evaluate_with(&mut self, initial: &S) -> &Chain<Node<S>>
    where
        S: StateFork,
    {
        debug!(
            generation = self.generation,
            length = self.sequence.len(),
            "evaluating derivation"
        );
        let mut state = SystemState::new(initial.fork());
        thread_state(&mut self.sequence, &mut state);
        &self.sequence
    }
}

impl<S> fmt::Debug for DerivationSequence<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationSequence")
            .field("generation", &self.generation)
            .field("length", &self.sequence.len())
            .field("productions", &self.productions.len())
            .finish()
    }
}
