use std::sync::OnceLock;
use time::format_description::BorrowedFormatItem;
use time::{macros::format_description, Date, Duration, OffsetDateTime, UtcOffset};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Capture the local UTC offset. Must run before any other thread is spawned,
/// since `time` refuses to read the offset from a multi-threaded process.
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let _ = LOCAL_OFFSET.set(offset);
}

fn local_offset() -> UtcOffset {
    LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC)
}

pub fn to_local_time(dt: OffsetDateTime) -> OffsetDateTime {
    dt.to_offset(local_offset())
}

/// Today's date in the user's local calendar.
pub fn today_local() -> Date {
    to_local_time(OffsetDateTime::now_utc()).date()
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Parse the date part of a `YYYY-MM-DD` or RFC 3339 string.
pub fn parse_date(s: &str) -> Option<Date> {
    let head = s.get(..10)?;
    Date::parse(head, DATE_FORMAT).ok()
}

pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}

pub fn add_days(date: Date, days: i64) -> Date {
    date.checked_add(Duration::days(days)).unwrap_or(date)
}

/// Relative wording for a due date, e.g. "Overdue by 2d".
pub fn due_label(days_until: i64) -> String {
    match days_until {
        d if d < 0 => format!("Overdue by {}d", -d),
        0 => "Due today".to_string(),
        d => format!("Due in {}d", d),
    }
}
