//! Module contract: the symbols of a derivation sequence.
//!
//! A module is a capability bundle: every module can change the threaded
//! state, and a module may additionally expose a query capability that
//! observes the state and records the observation on the module instance.
//! Concrete modules are supplied by the embedding application; the engine
//! only ever sees them through the traits here.
//!
//! Identity for rule matching is an explicit [`ModuleKind`] tag compared by
//! value. Two kinds are either equal or unrelated; there is no subtyping and
//! no hierarchy test.

use crate::state::SystemState;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Stable identity tag for a module, compared by exact value.
///
/// Embedders define one constant per module type, e.g.
/// `const MOVE_FORWARD: ModuleKind = ModuleKind::new(1)`. Productions match
/// predecessors and context neighbors against these tags.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleKind(u32);

impl ModuleKind {
    /// Creates a new `ModuleKind` from a raw `u32`.
    ///
    /// The caller is responsible for keeping tags distinct across the module
    /// types of one grammar.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` tag.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleKind({})", self.0)
    }
}

/// A symbol in the derivation sequence.
///
/// `change_state` runs at every visit during evaluation and may mutate the
/// threaded value in place. Implementations that have nothing to contribute
/// leave the body empty.
///
/// `as_any` exposes the concrete type so productions and inspection code can
/// downcast a `&dyn Module<S>` back to the module they constructed; the
/// canonical implementation is `fn as_any(&self) -> &dyn Any { self }`.
pub trait Module<S> {
    /// Stable identity used for rule matching.
    fn kind(&self) -> ModuleKind;

    /// Applies this module's effect to the threaded state.
    fn change_state(&mut self, state: &mut SystemState<S>);

    /// Returns the queryable view of this module, if it has one.
    ///
    /// Returning `Some` marks the module as queryable: during evaluation the
    /// query runs immediately after `change_state`, against the post-change
    /// state. The default is `None`.
    fn as_query(&mut self) -> Option<&mut dyn QueryModule<S>> {
        None
    }

    /// Concrete-type escape hatch for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Query capability: observe the threaded state after a change.
///
/// The observation is a side effect stored on the module instance (for
/// example a computed coordinate) and is read back by inspecting the module
/// after evaluation; nothing is returned to the traversal.
pub trait QueryModule<S> {
    /// Records the current state on the module instance.
    fn query_state(&mut self, state: &SystemState<S>);
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE: ModuleKind = ModuleKind::new(7);

    struct Probe {
        seen: Option<i32>,
    }

    impl Module<i32> for Probe {
        fn kind(&self) -> ModuleKind {
            PROBE
        }

        fn change_state(&mut self, state: &mut SystemState<i32>) {
            *state.current_mut() += 1;
        }

        fn as_query(&mut self) -> Option<&mut dyn QueryModule<i32>> {
            Some(self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl QueryModule<i32> for Probe {
        fn query_state(&mut self, state: &SystemState<i32>) {
            self.seen = Some(*state.current());
        }
    }

    #[test]
    fn kind_is_exact_value_equality() {
        assert_eq!(ModuleKind::new(3), ModuleKind::new(3));
        assert_ne!(ModuleKind::new(3), ModuleKind::new(4));
        assert_eq!(ModuleKind::new(3).as_u32(), 3);
    }

    #[test]
    fn query_observes_post_change_state() {
        let mut probe = Probe { seen: None };
        let mut state = SystemState::new(41);
        probe.change_state(&mut state);
        if let Some(query) = probe.as_query() {
            query.query_state(&state);
        }
        assert_eq!(probe.seen, Some(42));
    }

    #[test]
    fn downcast_via_as_any() {
        let probe = Probe { seen: Some(5) };
        let module: &dyn Module<i32> = &probe;
        let concrete = module.as_any().downcast_ref::<Probe>();
        assert_eq!(concrete.and_then(|p| p.seen), Some(5));
    }
}
