use chrono::{Duration, Local, Months, NaiveDate};

use crate::models::RecurringFrequency;

/// Computes the due date of the next occurrence of a recurring task.
///
/// The step is taken from the current due date, or from today when the task
/// has none. Monthly steps use calendar month arithmetic: chrono clamps
/// end-of-month overflow to the last day of the target month, so
/// 2024-01-31 plus one month is 2024-02-29.
pub fn next_due_date(current: Option<NaiveDate>, frequency: RecurringFrequency) -> NaiveDate {
    let base = current.unwrap_or_else(|| Local::now().date_naive());
    match frequency {
        RecurringFrequency::Daily => base + Duration::days(1),
        RecurringFrequency::Weekly => base + Duration::days(7),
        RecurringFrequency::Monthly => base
            .checked_add_months(Months::new(1))
            .unwrap_or(base),
    }
}
