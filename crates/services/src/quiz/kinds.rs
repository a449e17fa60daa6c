use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quiz_core::model::{Outcome, Question};

use super::source::QuestionSource;
use crate::error::DataLoadError;
use crate::sessions::SessionProgress;

/// What a quiz type needs to draw the current question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    pub question: &'a Question,
    pub progress: SessionProgress,
}

/// Behaviour shared by every quiz type: how its questions are loaded,
/// shown and checked.
#[async_trait]
pub trait QuizKind: Send + Sync {
    fn quiz_type(&self) -> QuizType;

    /// Load and validate the questions for one module.
    ///
    /// # Errors
    ///
    /// Returns `DataLoadError` if the source fails or the questions cannot be
    /// played by this quiz type.
    async fn load_questions(
        &self,
        source: &dyn QuestionSource,
        data_key: &str,
    ) -> Result<Vec<Question>, DataLoadError> {
        let questions = source.load(data_key).await?;
        for question in &questions {
            self.validate(question)
                .map_err(|reason| DataLoadError::Invalid {
                    data_key: data_key.to_owned(),
                    reason: format!("question {}: {reason}", question.id),
                })?;
        }
        Ok(questions)
    }

    /// Reject questions this quiz type cannot present.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason.
    fn validate(&self, question: &Question) -> Result<(), String>;

    /// Plain-text rendering of the question.
    fn render(&self, view: &QuestionView<'_>) -> String;

    fn check_answer(&self, question: &Question, input: &str) -> Outcome;

    /// Text to show once the learner has answered.
    fn reveal(&self, question: &Question) -> Option<String> {
        (!question.answer.is_empty()).then(|| question.answer.clone())
    }
}

/// Type tag read from the module catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
    IdiomComplete,
    WordClassify,
    PoemFill,
    DragFill,
    SentenceFill,
    ParagraphFill,
    CardMatch,
    Polyphone,
    LineMatch,
    WordRead,
    PoemRecite,
    TextMemory,
}

impl QuizType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizType::IdiomComplete => "idiom-complete",
            QuizType::WordClassify => "word-classify",
            QuizType::PoemFill => "poem-fill",
            QuizType::DragFill => "drag-fill",
            QuizType::SentenceFill => "sentence-fill",
            QuizType::ParagraphFill => "paragraph-fill",
            QuizType::CardMatch => "card-match",
            QuizType::Polyphone => "polyphone",
            QuizType::LineMatch => "line-match",
            QuizType::WordRead => "word-read",
            QuizType::PoemRecite => "poem-recite",
            QuizType::TextMemory => "text-memory",
        }
    }

    /// The variant that plays this type.
    #[must_use]
    pub fn kind(self) -> Arc<dyn QuizKind> {
        match self {
            QuizType::IdiomComplete
            | QuizType::PoemFill
            | QuizType::DragFill
            | QuizType::SentenceFill
            | QuizType::ParagraphFill => Arc::new(FillBlankQuiz(self)),
            QuizType::Polyphone | QuizType::WordClassify => Arc::new(ChoiceQuiz(self)),
            QuizType::CardMatch
            | QuizType::LineMatch
            | QuizType::WordRead
            | QuizType::PoemRecite
            | QuizType::TextMemory => Arc::new(SelfCheckQuiz(self)),
        }
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased answer text with whitespace and punctuation (ASCII and CJK) removed.
fn normalize(text: &str) -> String {
    const CJK_PUNCT: &str = "，。！？、；：“”‘’（）《》…—·「」";
    text.chars()
        .filter(|c| !c.is_whitespace() && !c.is_ascii_punctuation() && !CJK_PUNCT.contains(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// `answer` may list accepted alternatives separated by `|`.
fn matches_answer(answer: &str, input: &str) -> bool {
    let input = normalize(input);
    !input.is_empty()
        && answer
            .split('|')
            .any(|candidate| normalize(candidate) == input)
}

fn header(view: &QuestionView<'_>) -> String {
    format!(
        "[{}/{}] {}",
        view.progress.position, view.progress.total, view.question.prompt
    )
}

/// Typed answer filling a gap in the prompt.
#[derive(Debug, Clone, Copy)]
pub struct FillBlankQuiz(QuizType);

#[async_trait]
impl QuizKind for FillBlankQuiz {
    fn quiz_type(&self) -> QuizType {
        self.0
    }

    fn validate(&self, question: &Question) -> Result<(), String> {
        if normalize(&question.answer).is_empty() {
            return Err("missing answer".into());
        }
        Ok(())
    }

    fn render(&self, view: &QuestionView<'_>) -> String {
        let mut out = header(view);
        if let Some(hint) = &view.question.hint {
            let _ = write!(out, "\n  hint: {hint}");
        }
        out
    }

    fn check_answer(&self, question: &Question, input: &str) -> Outcome {
        matches_answer(&question.answer, input).into()
    }
}

/// Pick one of the listed options, by number or by text.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceQuiz(QuizType);

#[async_trait]
impl QuizKind for ChoiceQuiz {
    fn quiz_type(&self) -> QuizType {
        self.0
    }

    fn validate(&self, question: &Question) -> Result<(), String> {
        if question.options.is_empty() {
            return Err("no options".into());
        }
        if !question
            .options
            .iter()
            .any(|option| matches_answer(&question.answer, option))
        {
            return Err("answer is not one of the options".into());
        }
        Ok(())
    }

    fn render(&self, view: &QuestionView<'_>) -> String {
        let mut out = header(view);
        for (idx, option) in view.question.options.iter().enumerate() {
            let _ = write!(out, "\n  {}. {option}", idx + 1);
        }
        out
    }

    fn check_answer(&self, question: &Question, input: &str) -> Outcome {
        let picked = input
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| question.options.get(idx))
            .map_or(input, String::as_str);
        matches_answer(&question.answer, picked).into()
    }
}

/// Recite or recall, then self-report whether it was remembered.
#[derive(Debug, Clone, Copy)]
pub struct SelfCheckQuiz(QuizType);

#[async_trait]
impl QuizKind for SelfCheckQuiz {
    fn quiz_type(&self) -> QuizType {
        self.0
    }

    fn validate(&self, _question: &Question) -> Result<(), String> {
        Ok(())
    }

    fn render(&self, view: &QuestionView<'_>) -> String {
        format!("{}\n  remembered it? (y/n)", header(view))
    }

    fn check_answer(&self, _question: &Question, input: &str) -> Outcome {
        matches!(
            input.trim().to_lowercase().as_str(),
            "y" | "yes" | "1" | "是" | "会"
        )
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::InMemoryQuestionSource;

    fn view(question: &Question) -> QuestionView<'_> {
        QuestionView {
            question,
            progress: SessionProgress::new(0, 4),
        }
    }

    #[test]
    fn type_tags_parse_from_kebab_case() {
        let parsed: QuizType = serde_json::from_str("\"idiom-complete\"").unwrap();
        assert_eq!(parsed, QuizType::IdiomComplete);
        assert_eq!(parsed.to_string(), "idiom-complete");
        assert!(serde_json::from_str::<QuizType>("\"crossword\"").is_err());
        assert_eq!(QuizType::Polyphone.kind().quiz_type(), QuizType::Polyphone);
    }

    #[test]
    fn fill_blank_ignores_spacing_punctuation_and_accepts_alternatives() {
        let kind = QuizType::PoemFill.kind();
        let q = Question::new("1", "人心齐，____", "泰山移。|泰山移");
        assert_eq!(kind.check_answer(&q, " 泰山 移 "), Outcome::Correct);
        assert_eq!(kind.check_answer(&q, "泰山移！"), Outcome::Correct);
        assert_eq!(kind.check_answer(&q, "黄河"), Outcome::Wrong);
        assert_eq!(kind.check_answer(&q, "   "), Outcome::Wrong);
    }

    #[test]
    fn choice_accepts_number_or_text() {
        let kind = QuizType::Polyphone.kind();
        let q = Question::new("p1", "长大 的 长", "zhǎng").with_options(["cháng", "zhǎng"]);
        assert_eq!(kind.check_answer(&q, "2"), Outcome::Correct);
        assert_eq!(kind.check_answer(&q, "zhǎng"), Outcome::Correct);
        assert_eq!(kind.check_answer(&q, "1"), Outcome::Wrong);
        assert_eq!(kind.check_answer(&q, "9"), Outcome::Wrong);

        let rendered = kind.render(&view(&q));
        assert!(rendered.starts_with("[1/4] 长大 的 长"));
        assert!(rendered.contains("2. zhǎng"));
    }

    #[test]
    fn self_check_reads_yes_no() {
        let kind = QuizType::PoemRecite.kind();
        let q = Question::new("jys", "静夜思", "床前明月光，疑是地上霜。");
        assert_eq!(kind.check_answer(&q, "Y"), Outcome::Correct);
        assert_eq!(kind.check_answer(&q, "是"), Outcome::Correct);
        assert_eq!(kind.check_answer(&q, "n"), Outcome::Wrong);
        assert_eq!(kind.reveal(&q).as_deref(), Some("床前明月光，疑是地上霜。"));
    }

    #[tokio::test]
    async fn load_rejects_questions_the_type_cannot_play() {
        let source = InMemoryQuestionSource::new()
            .with_set("polyphones", vec![Question::new("1", "行", "xíng")])
            .with_set("lessons", vec![Question::new("1", "____", "")]);

        let err = QuizType::Polyphone
            .kind()
            .load_questions(&source, "polyphones")
            .await
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Invalid { .. }));

        let err = QuizType::ParagraphFill
            .kind()
            .load_questions(&source, "lessons")
            .await
            .unwrap_err();
        assert!(matches!(err, DataLoadError::Invalid { .. }));

        let ok = QuizType::TextMemory
            .kind()
            .load_questions(&source, "lessons")
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
    }
}
