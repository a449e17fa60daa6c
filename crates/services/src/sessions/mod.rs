mod progress;
mod scorer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use scorer::{ScorerStep, SessionScorer};
pub use workflow::{ModuleOverview, PracticeService, StartedSession};
