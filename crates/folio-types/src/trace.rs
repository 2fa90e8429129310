//! Named-operation traces for diagnostics.
//!
//! Public entry points of the model push their name onto a thread-local
//! stack with [`enter`] and pop it when the returned guard drops. Errors
//! and contract violations snapshot the stack, so a failure deep inside
//! `Transaction::step > Node::replace > Fragment::cut` reports the whole
//! chain of operations that led to it.

use std::cell::RefCell;
use std::fmt;

use tracing::error;

thread_local! {
    static OPS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Guard returned by [`enter`]; pops the operation name when dropped.
#[must_use = "the operation is popped as soon as the guard is dropped"]
pub struct OpGuard {
    _private: (),
}

impl Drop for OpGuard {
    fn drop(&mut self) {
        OPS.with(|ops| {
            ops.borrow_mut().pop();
        });
    }
}

/// Push a named operation onto the current thread's trace.
pub fn enter(op: &'static str) -> OpGuard {
    OPS.with(|ops| ops.borrow_mut().push(op));
    OpGuard { _private: () }
}

/// Ordered list of operation names, outermost first.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Trace(Vec<&'static str>);

impl Trace {
    /// Snapshot the current thread's operation stack.
    pub fn capture() -> Self {
        Self(OPS.with(|ops| ops.borrow().clone()))
    }

    /// An empty trace.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[&'static str] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The innermost operation, if any.
    pub fn innermost(&self) -> Option<&'static str> {
        self.0.last().copied()
    }

    /// Returns `true` if `op` appears anywhere in the trace.
    pub fn contains(&self, op: &str) -> bool {
        self.0.iter().any(|o| *o == op)
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trace({})", self.0.join(" > "))
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<top level>")
        } else {
            write!(f, "{}", self.0.join(" > "))
        }
    }
}

/// A programmer error: the caller broke the contract of an operation.
///
/// Raised as a panic payload by [`violation`]. Tests and embedders that
/// want to inspect it can `catch_unwind` and downcast the payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("contract violation: {message} (in {trace})")]
pub struct ContractViolation {
    pub message: String,
    pub trace: Trace,
}

/// Raise a [`ContractViolation`] carrying the current operation trace.
#[track_caller]
pub fn violation(message: impl Into<String>) -> ! {
    let violation = ContractViolation {
        message: message.into(),
        trace: Trace::capture(),
    };
    error!(trace = %violation.trace, "{}", violation.message);
    std::panic::panic_any(violation)
}
