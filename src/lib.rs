// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod focus_policy;
pub mod results;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod word;
pub mod word_bank;

pub use session::{GameSession, GameSummary, SessionConfig, SessionEvent, SessionStatus};
pub use word_bank::{WordBank, WordBankError};
