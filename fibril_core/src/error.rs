// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Errors surfaced by [`Root::work_loop`](crate::Root::work_loop).
///
/// Programming errors (foreign fiber handles, hooks called in a different
/// order) panic instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// A host adapter operation failed. The render pass that hit it has been
    /// discarded and the committed tree is unchanged.
    Host(E),
    /// The fiber graph reached a state the engine cannot interpret.
    Inconsistent(&'static str),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Host(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(err) => write!(f, "host adapter error: {err:?}"),
            Self::Inconsistent(what) => write!(f, "inconsistent fiber graph: {what}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}
