//! Type aliases for commonly used shared-state types.
//!
//! The toolpath core is single-threaded and cooperative, so shared mutable
//! state uses `Rc<RefCell<T>>` throughout. Resolved tool/process/task
//! records in particular are shared BY HANDLE: a task record aliases the
//! tool and process records it references, and record identity (via
//! `Rc::ptr_eq`) is what reference resolution and list pruning operate on.

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// This is the handle type for resolved records: lists hold `Shared<T>`
/// clones, and mutating a record through one handle is visible through all
/// of them.
///
/// # Example
/// ```rust,ignore
/// let record: Shared<ToolRecord> = shared(ToolRecord::default());
/// record.borrow_mut().feedrate = Some(400.0);
/// ```
pub type Shared<T> = Rc<RefCell<T>>;

/// An optional shared reference, for lazily-initialized shared state.
pub type SharedOption<T> = Rc<RefCell<Option<T>>>;

/// A shared vector for single-threaded collection management.
pub type SharedVec<T> = Rc<RefCell<Vec<T>>>;

/// Create a new `Shared<T>` from a value.
///
/// # Example
/// ```rust,ignore
/// let state = shared(Bounds3::default());
/// ```
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Create a new `SharedOption<T>` initialized to `None`.
#[inline]
pub fn shared_none<T>() -> SharedOption<T> {
    Rc::new(RefCell::new(None))
}

/// Create a new `SharedOption<T>` initialized to `Some(value)`.
#[inline]
pub fn shared_some<T>(value: T) -> SharedOption<T> {
    Rc::new(RefCell::new(Some(value)))
}
