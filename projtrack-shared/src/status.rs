/// Derived temporal status for projects
///
/// A project is *late* when it has a due date and that date is strictly
/// before "today". The comparison is made on calendar dates, never on
/// timestamps, so a project due today stays on time for the whole day.
///
/// The value is recomputed on every read and never stored.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use projtrack_shared::status::{is_late, Clock, FixedClock};
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let clock = FixedClock::new(today);
///
/// assert!(is_late(today.pred_opt(), clock.today()));
/// assert!(!is_late(Some(today), clock.today()));
/// assert!(!is_late(None, clock.today()));
/// ```

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Returns true iff `due_on` is present and strictly before `as_of`
pub fn is_late(due_on: Option<NaiveDate>, as_of: NaiveDate) -> bool {
    match due_on {
        Some(due) => due < as_of,
        None => false,
    }
}

/// Source of the current calendar date
///
/// Handlers never call `Utc::now()` directly for status evaluation; they ask
/// the clock held in application state so tests can pin "today".
pub trait Clock: Send + Sync {
    /// The calendar date considered "today"
    fn today(&self) -> NaiveDate;
}

/// Wall clock evaluated at a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Clock that evaluates "today" in UTC
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Clock that evaluates "today" at `hours` east of UTC
    ///
    /// Returns `None` if the offset is outside ±23 hours.
    pub fn with_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(|offset| Self { offset })
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}
