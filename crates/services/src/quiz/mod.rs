mod catalog;
mod kinds;
mod source;

pub use catalog::{Category, CategoryGroup, ModuleCatalog, QuizModule};
pub use kinds::{ChoiceQuiz, FillBlankQuiz, QuestionView, QuizKind, QuizType, SelfCheckQuiz};
pub use source::{InMemoryQuestionSource, JsonDirectorySource, QuestionSource};
