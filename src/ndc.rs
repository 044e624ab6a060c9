//! The nested diagnostic context.
//!
//! An NDC is a per-thread stack of strings. Code pushes a context string
//! on entry to a unit of work and pops it on exit; layouts interleave the
//! joined stack into log output so that events can be traced back to the
//! request that produced them.
//!
//! Contexts are strictly per-thread. A thread that spawns workers passes
//! context along explicitly: the parent calls [`clone_stack`] and the
//! child calls [`inherit`] with the snapshot.
//!
//! # Examples
//!
//! ```
//! log4g::ndc::push("request-42");
//! log4g::ndc::push("parse");
//! assert_eq!(log4g::ndc::get().as_deref(), Some("request-42 parse"));
//! log4g::ndc::clear();
//! ```

use std::cell::RefCell;

thread_local! {
    static STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Pushes a context string onto the calling thread's stack.
pub fn push<T: Into<String>>(context: T) {
    STACK.with(|stack| stack.borrow_mut().push(context.into()));
}

/// Pops the most recently pushed context string.
pub fn pop() -> Option<String> {
    STACK.with(|stack| stack.borrow_mut().pop())
}

/// Returns the most recently pushed context string without removing it.
pub fn peek() -> Option<String> {
    STACK.with(|stack| stack.borrow().last().cloned())
}

/// Removes all context from the calling thread's stack.
pub fn clear() {
    STACK.with(|stack| stack.borrow_mut().clear());
}

/// Returns the depth of the calling thread's stack.
pub fn size() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

/// Returns the full context as a space-joined string, or `None` if the
/// stack is empty.
pub fn get() -> Option<String> {
    STACK.with(|stack| {
        let stack = stack.borrow();
        if stack.is_empty() {
            None
        } else {
            Some(stack.join(" "))
        }
    })
}

/// Returns a deep copy of the calling thread's stack.
///
/// Hand the copy to a child thread, which adopts it via [`inherit`].
pub fn clone_stack() -> Vec<String> {
    STACK.with(|stack| stack.borrow().clone())
}

/// Replaces the calling thread's stack with an inherited snapshot.
pub fn inherit(stack: Vec<String>) {
    STACK.with(|cell| *cell.borrow_mut() = stack);
}

/// Truncates the stack to at most `depth` entries.
///
/// Useful to restore a known depth after a unit of work that may have
/// returned without popping.
pub fn set_max_depth(depth: usize) {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.len() > depth {
            stack.truncate(depth);
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        clear();
        push("foo");
        push("bar");
        push("baz");
        assert_eq!(get().as_deref(), Some("foo bar baz"));
        assert_eq!(size(), 3);
        assert_eq!(peek().as_deref(), Some("baz"));

        let snapshot = clone_stack();
        assert_eq!(snapshot, vec!["foo", "bar", "baz"]);

        set_max_depth(1);
        assert_eq!(size(), 1);
        assert_eq!(get().as_deref(), Some("foo"));

        clear();
        assert_eq!(get(), None);
        assert_eq!(pop(), None);
    }

    #[test]
    fn inherited_stack_replaces_wholesale() {
        clear();
        push("parent");
        let snapshot = clone_stack();

        std::thread::spawn(move || {
            push("stale");
            inherit(snapshot);
            assert_eq!(get().as_deref(), Some("parent"));
        })
        .join()
        .unwrap();

        clear();
    }
}
