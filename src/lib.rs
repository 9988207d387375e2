//! # abc-algo - letter learning core
//!
//! Pure Rust core of a children's letter-learning game:
//!
//! - **Letter Selector** - adaptive, weighted choice of the next letter with
//!   forced remediation and anti-repetition
//! - **Progression Tracker** - two-flawless-runs-per-tier unlock cadence and
//!   the curriculum ratchet at full mastery
//! - **Mastery Ledger** - per-letter wrong counts, correct streaks and a
//!   bounded attempt log over an injected key-value store
//!
//! ## Modules
//!
//! - [`letter`] - letter type and normalization
//! - [`types`] - constants, enums and the persisted state
//! - [`config`] - tunable constants
//! - [`rng`] - injected randomness
//! - [`selector`] - `pick_next` and `make_options`
//! - [`progression`] - `advance_after_run` and guided-path meta
//! - [`ledger`] - mastery bookkeeping, reducers and state repair
//! - [`store`] - persistence contract with memory and JSON file stores
//! - [`session`] - the round loop of a single run
//! - [`simulate`] - parallel learner simulation
//!
//! ## Example
//!
//! ```rust
//! use abc_algo::{AlgoConfig, MasteryLedger, MemoryStore, SeededRng, Session};
//!
//! let ledger = MasteryLedger::new(MemoryStore::new(), AlgoConfig::default());
//! let mut rng = SeededRng::seeded(7);
//!
//! let mut session = Session::start(&ledger, &["A", "B", "C", "D"], Some(3)).unwrap();
//! while session.has_next() {
//!     let prompt = session.next_prompt(&mut rng).unwrap();
//!     session.answer(prompt.target.as_str()).unwrap();
//! }
//! let summary = session.finish().unwrap();
//! assert_eq!(summary.ok, 3);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod letter;
pub mod logging;
pub mod progression;
pub mod rng;
pub mod selector;
pub mod session;
pub mod simulate;
pub mod store;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use config::AlgoConfig;
pub use error::{AlgoError, AlgoResult};
pub use ledger::{repair_state, MasteryLedger, StateUpdate};
pub use letter::{normalise_letter, normalise_list, Letter, ALPHABET};
pub use progression::{PathProgress, ProgressionTracker, RunResult};
pub use rng::{RandSource, SeededRng, UnitRng};
pub use selector::{LetterSelector, PickRequest, RecentHistory};
pub use session::{eligible_pool, Medal, Prompt, RunSummary, Session};
pub use store::{JsonFileStore, MemoryStore, ProgressStore, StorageError};
