pub mod answer_task;
pub mod coordinator;
pub mod protocol;
pub mod read_task;
pub mod state;
pub mod summary_task;

// Re-export the coordinator and its notifications so the front end and tests
// can reach them without spelling out the module tree.
pub use coordinator::SessionCoordinator;
pub use protocol::{NoticeLevel, SessionEvent, SessionSnapshot};
pub use state::AppState;
