const SECONDS_PER_DAY: i64 = 86_400;

/// Days until the next periodic review is due. Zero or negative means due.
///
/// A store that has never been reviewed counts from the epoch, so it is
/// always overdue.
pub fn review_due_in_days(last_review_at: Option<i64>, frequency_days: i64, now: i64) -> i64 {
    let elapsed = now.saturating_sub(last_review_at.unwrap_or(0));
    frequency_days - elapsed.div_euclid(SECONDS_PER_DAY)
}
