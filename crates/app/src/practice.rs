use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use quiz_core::model::{Outcome, ScoreBand, SessionSummary};
use quiz_core::time::format_elapsed;
use services::{QuestionView, ScorerStep, StartedSession};

/// How an interactive session ended.
#[derive(Debug)]
pub enum PracticeEnd {
    Completed(SessionSummary),
    /// `:quit` or end of input before the last question.
    Quit,
}

enum Command<'a> {
    Prev,
    Next,
    Quit,
    Answer(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            ":prev" | ":p" => Command::Prev,
            ":next" | ":n" => Command::Next,
            ":quit" | ":q" => Command::Quit,
            answer => Command::Answer(answer),
        }
    }
}

/// Drive one session from `input` until it completes or the learner quits.
///
/// # Errors
///
/// Returns an I/O error if reading input or writing output fails.
pub async fn run_session<R, W>(
    started: StartedSession,
    input: &mut R,
    out: &mut W,
) -> std::io::Result<PracticeEnd>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let StartedSession {
        module,
        kind,
        mut scorer,
    } = started;

    out.write_all(
        format!(
            "{} ({} 题)  answer, or :prev / :next / :quit\n",
            module.title,
            scorer.total()
        )
        .as_bytes(),
    )
    .await?;

    let mut line = String::new();
    loop {
        let rendered = kind.render(&QuestionView {
            question: scorer.current_question(),
            progress: scorer.progress(),
        });
        out.write_all(format!("\n{rendered}\n> ").as_bytes()).await?;
        out.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            scorer.abandon();
            out.write_all(b"\n").await?;
            return Ok(PracticeEnd::Quit);
        }

        match Command::parse(&line) {
            Command::Quit => {
                scorer.abandon();
                out.write_all("已退出，本次练习不计入统计。\n".as_bytes())
                    .await?;
                return Ok(PracticeEnd::Quit);
            }
            Command::Prev => {
                if !scorer.retreat() {
                    out.write_all("已经是第一题。\n".as_bytes()).await?;
                }
                continue;
            }
            Command::Next => {}
            Command::Answer("") => continue,
            Command::Answer(_) if scorer.is_current_answered() => {
                out.write_all("这题已经答过了。\n".as_bytes()).await?;
            }
            Command::Answer(answer) => {
                let question = scorer.current_question().clone();
                let outcome = kind.check_answer(&question, answer);
                scorer.record_outcome(outcome).await;
                let feedback = match (outcome, kind.reveal(&question)) {
                    (Outcome::Correct, _) => "✓ 正确\n".to_owned(),
                    (Outcome::Wrong, Some(answer)) => format!("✗ 答案：{answer}\n"),
                    (Outcome::Wrong, None) => "✗\n".to_owned(),
                };
                out.write_all(feedback.as_bytes()).await?;
            }
        }

        scorer = match scorer.advance().await {
            ScorerStep::Active(next) => next,
            ScorerStep::Complete(summary) => {
                out.write_all(render_summary(&summary).as_bytes()).await?;
                out.flush().await?;
                return Ok(PracticeEnd::Completed(summary));
            }
        };
    }
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Good => "优秀",
        ScoreBand::Ok => "良好",
        ScoreBand::NeedsPractice => "需加强",
    }
}

pub fn render_summary(summary: &SessionSummary) -> String {
    let mut out = format!(
        "\n练习完成！\n  答题数量  {} 题\n  正确数量  {} 题\n  正确率    {}% ({})\n  用时      {}\n",
        summary.questions_answered(),
        summary.correct_count(),
        summary.accuracy_percent(),
        band_label(summary.band()),
        format_elapsed(summary.elapsed_seconds()),
    );
    if summary.is_perfect() {
        out.push_str("🎉 全部正确，太棒了！\n");
    }
    out
}
