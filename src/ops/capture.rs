use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc, Weekday};
use regex::Regex;

/// Hour of day (UTC) that parsed dates resolve to
const SCHEDULE_HOUR: u32 = 9;

static CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("context regex is valid"));
static TOMORROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btomorrow\b").expect("tomorrow regex is valid"));
static IN_DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin (\d{1,5}) days?\b").expect("in-days regex is valid"));
static NEXT_WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bnext (monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday regex is valid")
});

/// Structured fields pulled out of a quick-capture line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCapture {
    pub title: String,
    pub context: Option<String>,
    pub tags: Vec<String>,
    pub scheduled_for: Option<i64>,
}

/// Parse a raw capture line.
///
/// Recognizes `@context`, trailing `#tags`, and the date phrases
/// `tomorrow`, `in N days` and `next <weekday>`. Each recognized token is
/// removed from the title. If nothing is left, the trimmed input is the title.
pub fn parse_capture(input: &str, now: DateTime<Utc>) -> ParsedCapture {
    let raw = input.trim();
    let mut text = raw.to_string();
    let mut context = None;
    let mut scheduled_for = None;

    if let Some(caps) = CONTEXT_RE.captures(&text) {
        context = Some(caps[1].to_string());
        text = CONTEXT_RE.replace(&text, "").into_owned();
    }

    let today = now.date_naive();

    if TOMORROW_RE.is_match(&text) {
        scheduled_for = today.succ_opt().and_then(at_schedule_hour);
        text = TOMORROW_RE.replace(&text, "").into_owned();
    }

    if let Some(caps) = IN_DAYS_RE.captures(&text)
        && let Ok(days) = caps[1].parse::<i64>()
    {
        scheduled_for = TimeDelta::try_days(days)
            .and_then(|delta| today.checked_add_signed(delta))
            .and_then(at_schedule_hour);
        text = IN_DAYS_RE.replace(&text, "").into_owned();
    }

    if let Some(caps) = NEXT_WEEKDAY_RE.captures(&text)
        && let Ok(weekday) = caps[1].parse::<Weekday>()
    {
        scheduled_for = next_weekday(today, weekday).and_then(at_schedule_hour);
        text = NEXT_WEEKDAY_RE.replace(&text, "").into_owned();
    }

    let (title, tags) = split_trailing_tags(&collapse_whitespace(&text));
    let title = if title.is_empty() {
        raw.to_string()
    } else {
        title
    };

    ParsedCapture {
        title,
        context,
        tags,
        scheduled_for,
    }
}

/// Split `#tag` words off the end of a title. Tags in the middle stay put.
fn split_trailing_tags(s: &str) -> (String, Vec<String>) {
    let mut tags = Vec::new();
    let mut words: Vec<&str> = s.split(' ').filter(|w| !w.is_empty()).collect();
    while let Some(last) = words.last() {
        match last.strip_prefix('#') {
            Some(tag) if !tag.is_empty() && !tag.contains('#') => {
                tags.push(tag.to_string());
                words.pop();
            }
            _ => break,
        }
    }
    tags.reverse();
    (words.join(" "), tags)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `weekday` strictly after `today`.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let ahead = (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today.checked_add_signed(TimeDelta::days(i64::from(ahead)))
}

fn at_schedule_hour(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(SCHEDULE_HOUR, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
}
