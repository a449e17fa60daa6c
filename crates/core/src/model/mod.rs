mod ids;
mod progress;
mod question;
mod session;
mod stats;

pub use ids::{ModuleId, QuestionId};
pub use progress::{CorrectQuestionSet, CorrectQuestions, ModuleProgress, ProgressMap};
pub use question::{Outcome, Question};
pub use session::{ScoreBand, SessionSummary};
pub use stats::{StatsError, StoredStats};
