//! Recursion unrolled at compile time.
//!
//! `Frame<Next>` is one stack frame holding a guard, `Base` ends the chain.
//! Each level is a distinct monomorphized function, so the call depth is
//! fixed by the type rather than by a runtime counter.

use std::marker::PhantomData;

use super::Variant;

/// A chain of frames of known depth.
pub trait Frames {
    /// Number of guard-holding frames in the chain.
    const DEPTH: u32;

    /// Walk the chain for variant `V`.
    fn run<V: Variant>(fail: bool);
}

/// End of a chain.
pub struct Base;

/// One frame in front of `Next`.
pub struct Frame<Next>(PhantomData<Next>);

impl Frames for Base {
    const DEPTH: u32 = 0;

    #[inline(never)]
    fn run<V: Variant>(_fail: bool) {}
}

impl<Next: Frames> Frames for Frame<Next> {
    const DEPTH: u32 = Next::DEPTH + 1;

    #[inline(never)]
    fn run<V: Variant>(fail: bool) {
        let _guard = V::guard(fail);
        Next::run::<V>(fail);
    }
}

/// Eight frames in front of `T`.
pub type Frames8<T> = Frame<Frame<Frame<Frame<Frame<Frame<Frame<Frame<T>>>>>>>>;

/// Sixty-four frames.
pub type Frames64 =
    Frames8<Frames8<Frames8<Frames8<Frames8<Frames8<Frames8<Frames8<Base>>>>>>>>;

/// Depth used by the benchmark suite.
pub type UnrolledDepth = Frames64;
