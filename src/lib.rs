//! Lindenmayer: a generic engine for parametric, context-sensitive
//! L-systems.
//!
//! This crate implements the rewrite core of an L-system and nothing else:
//! - An ordered, branching derivation sequence over user-supplied modules.
//! - Context-sensitive productions with condition and stochastic-acceptance
//!   gates, applied generation by generation.
//! - A state-threading evaluator that walks the result depth-first, forking
//!   the state into every branch.
//!
//! Concrete modules ("move forward", "rotate", "record a point") and the
//! productions over them belong to the embedding application; the engine
//! only sees their kind tags and capability traits. There is no grammar
//! parser, no renderer, and no persistence here.
//!
//! # Determinism
//! The single source of non-determinism is the random source consulted by
//! probability tests. It is injected per derivation sequence and never
//! global, so an explicitly seeded derivation replays exactly.
//!
//! # Citations
//! - Lindenmayer, "Mathematical models for cellular interactions in
//!   development" (1968)
//! - Prusinkiewicz & Lindenmayer, "The Algorithmic Beauty of Plants" (1990)
//!
//! # Example
//!
//! ```
//! use lindenmayer::prelude::*;
//! use std::any::Any;
//!
//! const CELL: ModuleKind = ModuleKind::new(0);
//!
//! struct Cell {
//!     age: u32,
//! }
//!
//! impl Module<i32> for Cell {
//!     fn kind(&self) -> ModuleKind {
//!         CELL
//!     }
//!     fn change_state(&mut self, state: &mut SystemState<i32>) {
//!         *state.current_mut() += self.age as i32;
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! // Every generation, each cell divides into an older cell and a new one.
//! let division = Production::new(CELL, |generation, window| {
//!     let age = window.node.module_as::<Cell>().map(|c| c.age).unwrap_or(0);
//!     vec![
//!         Node::new(generation, Cell { age: age + 1 }),
//!         Node::new(generation, Cell { age: 1 }),
//!     ]
//! });
//!
//! let axiom = vec![Node::new(0, Cell { age: 1 })];
//! let mut system = DerivationSequence::new(axiom, vec![division]).unwrap();
//! system.advance_generation().unwrap();
//! system.advance_generation().unwrap();
//! assert_eq!(system.len(), 4);
//!
//! // Thread a state value through the derivation.
//! system.evaluate_with(&0);
//! ```

pub mod chain;
pub mod module;
pub mod node;
pub mod production;
pub mod random;
pub mod sequence;
pub mod state;

pub use crate::chain::{Chain, SlotId};
pub use crate::module::{Module, ModuleKind, QueryModule};
pub use crate::node::{Branch, Node};
pub use crate::production::{MatchWindow, Production};
pub use crate::random::{RandomSource, RngSource, ScriptedSource};
pub use crate::sequence::{DerivationSequence, EngineError};
pub use crate::state::{thread_state, StateFork, SystemState};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::chain::{Chain, SlotId};
    pub use crate::module::{Module, ModuleKind, QueryModule};
    pub use crate::node::{Branch, Node};
    pub use crate::production::{MatchWindow, Production};
    pub use crate::random::{RandomSource, RngSource, ScriptedSource};
    pub use crate::sequence::{DerivationSequence, EngineError};
    pub use crate::state::{thread_state, StateFork, SystemState};
}
