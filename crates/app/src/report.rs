use std::fmt::Write as _;

use chrono::NaiveDate;

use quiz_core::model::StoredStats;
use quiz_core::time::format_elapsed;
use services::{ModuleCatalog, ModuleOverview};

/// Module grid grouped by category, in catalog order.
pub fn render_modules(catalog: &ModuleCatalog, overview: &[ModuleOverview]) -> String {
    let mut out = String::new();
    for group in catalog.groups() {
        let _ = writeln!(out, "== {} ==", group.category.title());
        for module in &group.modules {
            let Some(entry) = overview.iter().find(|o| o.module.id == module.id) else {
                continue;
            };
            let badge = if entry.completed { "✓" } else { " " };
            let progress = match entry.total_questions {
                Some(total) => format!("{:>3}% of {total}", entry.percent),
                None => "data unavailable".to_owned(),
            };
            let _ = writeln!(
                out,
                "  [{badge}] {:<22} {}  {progress}",
                module.id.as_str(),
                module.title
            );
        }
    }
    out
}

/// "今天" / "昨天" / "N天前" relative to `today`, or "—" before any study.
pub fn last_study_label(stats: &StoredStats, today: NaiveDate) -> String {
    match stats.days_since_last_study(today) {
        None => "—".to_owned(),
        Some(days) if days <= 0 => "今天".to_owned(),
        Some(1) => "昨天".to_owned(),
        Some(days) => format!("{days}天前"),
    }
}

pub struct StatsReport {
    pub stats: StoredStats,
    pub today: NaiveDate,
    pub mastered: usize,
    pub overall_percent: u8,
    pub completion_percent: u8,
}

impl StatsReport {
    pub fn render(&self) -> String {
        let stats = &self.stats;
        format!(
            "累计答题  {} 题\n答对      {} 题\n正确率    {}%\n学习时长  {}\n上次学习  {}\n已掌握    {} 题\n总进度    {}%\n完成模块  {}%\n",
            stats.total_questions(),
            stats.correct_answers(),
            stats.accuracy_percent(),
            format_elapsed(stats.total_time()),
            last_study_label(stats, self.today),
            self.mastered,
            self.overall_percent,
            self.completion_percent,
        )
    }
}

#[cfg(test)]
mod tests {
    use quiz_core::model::ModuleId;
    use services::QuizModule;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn last_study_is_relative() {
        let mut stats = StoredStats::default();
        assert_eq!(last_study_label(&stats, day(10)), "—");

        stats.append_session(5, 3, 42, day(10)).unwrap();
        assert_eq!(last_study_label(&stats, day(10)), "今天");
        assert_eq!(last_study_label(&stats, day(11)), "昨天");
        assert_eq!(last_study_label(&stats, day(14)), "4天前");
    }

    #[test]
    fn stats_report_lists_totals() {
        let mut stats = StoredStats::default();
        stats.append_session(5, 3, 42, day(10)).unwrap();
        let text = StatsReport {
            stats,
            today: day(12),
            mastered: 3,
            overall_percent: 40,
            completion_percent: 6,
        }
        .render();
        assert!(text.contains("累计答题  5 题"));
        assert!(text.contains("正确率    60%"));
        assert!(text.contains("学习时长  42s"));
        assert!(text.contains("上次学习  2天前"));
        assert!(text.contains("总进度    40%"));
    }

    #[test]
    fn module_grid_marks_completion_and_missing_data() {
        let catalog = ModuleCatalog::builtin();
        let module = |id: &str| -> QuizModule { catalog.module(id).unwrap().clone() };
        let overview = vec![
            ModuleOverview {
                module: module("poems"),
                completed: true,
                total_questions: Some(11),
                percent: 100,
            },
            ModuleOverview {
                module: module("polyphones"),
                completed: false,
                total_questions: None,
                percent: 0,
            },
        ];
        let text = render_modules(&catalog, &overview);
        assert!(text.contains("== 古诗背诵 =="));
        assert!(text.contains("[✓] poems"));
        assert!(text.contains("100% of 11"));
        assert!(text.contains("data unavailable"));
        assert!(!text.contains(ModuleId::new("idiom-body").as_str()));
    }
}
