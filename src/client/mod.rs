//! Review API client modules
//!
//! The HTTP client, its error type, the polling cursor and the poll loop that
//! ties them to the notifier.

pub mod api;
pub mod cursor;
pub mod error;
pub mod poller;

// Re-export main types for convenience
pub use api::{HomeworkSource, PracticumApi};
pub use cursor::PollCursor;
pub use error::ClientError;
pub use poller::{HomeworkPoller, TickOutcome};

pub type Result<T> = std::result::Result<T, ClientError>;
