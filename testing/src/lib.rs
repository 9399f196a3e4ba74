//! # Reminders Testing
//!
//! Testing utilities and helpers for the reminder lists store.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits (clock, ids)
//! - In-memory and failing storage backends
//! - A Given-When-Then harness for reducers plus effect assertions
//!
//! ## Example
//!
//! ```ignore
//! use reminders_testing::{InMemoryStorage, SequentialIdGenerator, test_clock};
//!
//! #[tokio::test]
//! async fn test_reset_flow() {
//!     let env = ReminderEnvironment::new(
//!         Arc::new(test_clock()),
//!         Arc::new(SequentialIdGenerator::new("id")),
//!         Arc::new(InMemoryStorage::new()),
//!     );
//!     let store = Store::new(ReminderState::default(), ReminderReducer, env);
//!
//!     store.send(ReminderAction::ResetAllItems).await?;
//! }
//! ```

use chrono::{DateTime, Utc};
use reminders_core::environment::{Clock, IdGenerator};

/// In-memory storage backends for tests
pub mod storage_mocks;


/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reminders_testing::mocks::FixedClock;
    /// use reminders_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `{prefix}-1`, `{prefix}-2`, ...
    ///
    /// ```
    /// use reminders_testing::mocks::SequentialIdGenerator;
    /// use reminders_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new("list");
    /// assert_eq!(ids.next_id(), "list-1");
    /// assert_eq!(ids.next_id(), "list-2");
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is `{prefix}-1`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new("id")
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SequentialIdGenerator, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use storage_mocks::{FailingStorage, InMemoryStorage};
