//! Chat session orchestration for talkwave
//!
//! [`ChatSession`] is the single writer of a conversation: it turns user
//! input and inbound broker events into appended messages, keeps the local
//! snapshot current and dispatches through the mode chosen at construction.

pub mod log;
pub mod mode;
pub mod session;

pub use log::ChatLog;
pub use mode::{SessionMode, SessionSettings};
pub use session::{ChatSession, Connectivity, RecordingStatus, SessionState, Submission};
