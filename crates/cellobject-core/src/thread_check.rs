//! Thread affinity verification for owner-context state.
//!
//! The update scheduler and the displayed model belong to one cooperative
//! context. Everything that mutates them records a [`ThreadAffinity`] at
//! construction and checks it on entry.
//!
//! Two levels of checking are provided:
//!
//! - **Debug assertions** ([`ThreadAffinity::debug_assert_same_thread`]): only
//!   active in debug builds.
//! - **Runtime assertions** ([`ThreadAffinity::assert_same_thread`]): always
//!   active.
//!
//! # Example
//!
//! ```
//! use cellobject_core::thread_check::ThreadAffinity;
//!
//! struct Owner {
//!     affinity: ThreadAffinity,
//!     value: std::cell::Cell<i32>,
//! }
//!
//! impl Owner {
//!     fn set_value(&self, v: i32) {
//!         self.affinity.debug_assert_same_thread();
//!         self.value.set(v);
//!     }
//! }
//!
//! let owner = Owner { affinity: ThreadAffinity::current(), value: std::cell::Cell::new(0) };
//! owner.set_value(3);
//! ```

use std::thread::ThreadId;

/// Records the thread an object was created on.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("object accessed from wrong thread")
    }

    /// Assert that we are on the same thread, with a custom message.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Debug-only assertion that we are on the same thread.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }

    /// Debug-only assertion with a custom message.
    #[inline]
    pub fn debug_assert_same_thread_with_msg(&self, msg: &str) {
        #[cfg(debug_assertions)]
        self.assert_same_thread_with_msg(msg);
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "thread affinity violation: {msg}\n\
             owner thread: {:?}\n\
             current thread: \"{current_name}\" ({current_id:?})\n\
             post the call to the owner's RunLoop instead",
            self.thread_id
        )
    }
}
