use quiz_core::score::rounded_percent;

/// Aggregated view of session progress, useful for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub percent: u8,
}

impl SessionProgress {
    #[must_use]
    pub fn new(current_index: usize, total: usize) -> Self {
        let position = (current_index + 1).min(total);
        Self {
            position,
            total,
            percent: rounded_percent(position as u64, total as u64),
        }
    }
}
