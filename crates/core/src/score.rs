//! Integer percentage helpers shared by progress and scoring.

/// Percentage of `part` over `whole`, rounded half-up and clamped to `0..=100`.
///
/// A zero `whole` yields 0: with no denominator there is no progress to claim.
#[must_use]
pub fn rounded_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u128::from(part);
    let whole = u128::from(whole);
    let pct = (200 * part + whole) / (2 * whole);
    u8::try_from(pct.min(100)).unwrap_or(100)
}
