//! Threaded state and the evaluation traversal.
//!
//! Evaluation walks the sequence depth-first in order, carrying one logical
//! state value left to right. Entering a branch forks the state, so the
//! branch runs against an independent snapshot taken at the point of entry;
//! siblings after the branch continue with the original, unforked value.

use crate::chain::Chain;
use crate::node::Node;
use std::cell::RefCell;
use std::rc::Rc;

/// Fork capability for threaded state payloads.
///
/// `fork` is invoked when evaluation begins and whenever a branch is
/// entered. A deep-copying implementation gives each branch full isolation.
/// Handle types may instead clone the handle (see the `Rc` implementation),
/// in which case mutations are shared and isolation is the embedder's
/// responsibility.
pub trait StateFork {
    /// Produces the value a forked traversal will thread.
    fn fork(&self) -> Self;
}

macro_rules! impl_fork_by_copy {
    ($($ty:ty)*) => {
        $(
            impl StateFork for $ty {
                #[inline]
                fn fork(&self) -> Self {
                    *self
                }
            }
        )*
    };
}

impl_fork_by_copy!(() bool char
    i8 i16 i32 i64 i128 isize
    u8 u16 u32 u64 u128 usize
    f32 f64);

impl StateFork for String {
    fn fork(&self) -> Self {
        self.clone()
    }
}

/// Aliasing fork: clones the handle, not the value behind it.
///
/// A branch threading an `Rc<RefCell<T>>` state sees and produces mutations
/// visible to the rest of the traversal.
impl<T: ?Sized> StateFork for Rc<RefCell<T>> {
    fn fork(&self) -> Self {
        Rc::clone(self)
    }
}

/// The state value threaded through an evaluation.
///
/// One `SystemState` exists per evaluation entry and per branch descent; it
/// is dropped when the traversal that created it completes.
pub struct SystemState<S> {
    current: S,
}

impl<S> SystemState<S> {
    /// Wraps an already-forked (or freshly built) payload.
    pub fn new(current: S) -> Self {
        Self { current }
    }

    /// Shared view of the threaded value.
    #[inline]
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Mutable view of the threaded value.
    #[inline]
    pub fn current_mut(&mut self) -> &mut S {
        &mut self.current
    }
}

impl<S: StateFork> SystemState<S> {
    /// Forks this state for a branch descent.
    pub fn fork(&self) -> Self {
        Self {
            current: self.current.fork(),
        }
    }
}

/// Depth-first state threading over a node sequence.
///
/// At each node: `change_state`, then `query_state` when the module is
/// queryable, then a recursive descent into the branch with a forked state.
/// Branch mutations never leak into the continuation; sibling branches share
/// nothing.
pub fn thread_state<S: StateFork>(sequence: &mut Chain<Node<S>>, state: &mut SystemState<S>) {
    let mut cursor = sequence.head();
    while let Some(current) = cursor {
        let next = sequence.next(current);
        if let Some(node) = sequence.get_mut(current) {
            node.module_mut().change_state(state);
            if let Some(query) = node.module_mut().as_query() {
                query.query_state(state);
            }
            if let Some(branch) = node.branch_mut() {
                let mut forked = state.fork();
                thread_state(branch, &mut forked);
            }
        }
        cursor = next;
    }
}
