//! Best-effort natural-language date extraction.
//!
//! Scans free text for date/time phrases ("tomorrow at 5pm", "next friday",
//! "march 3", "in 2 weeks") and resolves the longest match against a
//! reference instant. The store's free-text add path consumes this through
//! the single [`extract_date_phrase`] entry point, so the extractor is
//! swappable without touching the store.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone};

/// A date phrase located in free text
#[derive(Debug, Clone, PartialEq)]
pub struct DateMatch {
    /// Byte offset where the phrase starts in the original text
    pub start: usize,
    /// Byte offset just past the phrase
    pub end: usize,
    /// The matched substring, verbatim
    pub matched: String,
    /// The phrase resolved against the reference instant
    pub resolved: DateTime<Local>,
}

/// A whitespace-delimited word with surrounding punctuation trimmed off
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    word: &'a str,
    start: usize,
    end: usize,
}

/// Date and/or time components recovered from a phrase
#[derive(Debug, Default, Clone, Copy)]
struct Parts {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
}

/// Scan `text` for the longest date/time phrase and resolve it.
///
/// Missing components default to the reference: a bare date keeps the
/// reference time of day (so "tomorrow" is exactly reference + 1 day), and
/// a bare clock time lands on the reference date with no future rollover
/// ("at 5pm" is today 17:00 even if that has already passed). Ties between
/// equally long matches go to the earliest.
pub fn extract_date_phrase(text: &str, reference: DateTime<Local>) -> Option<DateMatch> {
    let tokens = tokenize(text);
    let mut best: Option<(usize, usize, Parts)> = None;

    for i in 0..tokens.len() {
        if let Some((consumed, parts)) = match_at(&tokens, i, reference.date_naive()) {
            let longer = match best {
                None => true,
                Some((best_consumed, _, _)) => consumed > best_consumed,
            };
            if longer {
                best = Some((consumed, i, parts));
            }
        }
    }

    let (consumed, index, parts) = best?;
    let start = tokens[index].start;
    let end = tokens[index + consumed - 1].end;

    let date = parts.date.unwrap_or_else(|| reference.date_naive());
    let time = parts.time.unwrap_or_else(|| reference.time());
    let resolved = match Local.from_local_datetime(&date.and_time(time)) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earliest, _) => earliest,
        chrono::LocalResult::None => reference,
    };

    Some(DateMatch {
        start,
        end,
        matched: text[start..end].to_string(),
        resolved,
    })
}

/// Remove a matched phrase from `text` and tidy the seam it leaves behind
pub fn strip_phrase(text: &str, found: &DateMatch) -> String {
    let mut remainder = String::with_capacity(text.len());
    remainder.push_str(&text[..found.start]);
    remainder.push_str(&text[found.end..]);

    // Collapse whitespace runs the removal may have created
    let mut cleaned = String::with_capacity(remainder.len());
    let mut last_was_space = false;
    for ch in remainder.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                cleaned.push(' ');
            }
            last_was_space = true;
        } else {
            cleaned.push(ch);
            last_was_space = false;
        }
    }

    cleaned
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '.'))
        .to_string()
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                push_word(text, s, idx, &mut tokens);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        push_word(text, s, text.len(), &mut tokens);
    }

    tokens
}

/// Trim surrounding punctuation so "tomorrow," matches but the comma stays
/// out of the removed span
fn push_word<'a>(text: &'a str, mut start: usize, mut end: usize, out: &mut Vec<Token<'a>>) {
    while start < end {
        match text[start..end].chars().next() {
            Some(ch) if !ch.is_alphanumeric() => start += ch.len_utf8(),
            _ => break,
        }
    }
    while end > start {
        match text[start..end].chars().next_back() {
            Some(ch) if !ch.is_alphanumeric() => end -= ch.len_utf8(),
            _ => break,
        }
    }
    if start < end {
        out.push(Token {
            word: &text[start..end],
            start,
            end,
        });
    }
}

/// Try to match a phrase starting at token `i`. Returns the token count
/// consumed and the recovered components.
fn match_at(tokens: &[Token<'_>], i: usize, today: NaiveDate) -> Option<(usize, Parts)> {
    if let Some((consumed, date)) = match_date_at(tokens, i, today) {
        // A clock time may extend any date phrase: "tomorrow at 5pm"
        let mut total = consumed;
        let mut parts = Parts {
            date: Some(date),
            time: None,
        };
        if let Some((extra, time)) = match_time_at(tokens, i + consumed) {
            total += extra;
            parts.time = Some(time);
        }
        return Some((total, parts));
    }

    if let Some((consumed, time)) = match_time_at(tokens, i) {
        return Some((
            consumed,
            Parts {
                date: None,
                time: Some(time),
            },
        ));
    }

    None
}

/// Match a date phrase at token `i`, longest form first
fn match_date_at(tokens: &[Token<'_>], i: usize, today: NaiveDate) -> Option<(usize, NaiveDate)> {
    let first = tokens.get(i)?.word.to_lowercase();

    // "in 3 days" / "in 2 weeks" / "in 1 month", plus the compact "in 3d"
    if first == "in" {
        if let (Some(count), Some(unit)) = (tokens.get(i + 1), tokens.get(i + 2)) {
            if let (Ok(n), Some(days_per_unit)) =
                (count.word.parse::<i64>(), unit_days(&unit.word.to_lowercase()))
            {
                return Some((3, today + Duration::days(n * days_per_unit)));
            }
        }
        if let Some(compact) = tokens.get(i + 1) {
            if let Some(date) = parse_compact_offset(&compact.word.to_lowercase(), today) {
                return Some((2, date));
            }
        }
        return None;
    }

    // "next friday" / "this friday"
    if first == "next" || first == "this" {
        if let Some(target) = tokens
            .get(i + 1)
            .and_then(|t| weekday_index(&t.word.to_lowercase()))
        {
            return Some((2, resolve_weekday(today, target, first == "next")));
        }
        return None;
    }

    // "march 3" / "mar 3rd"
    if let Some(month) = month_index(&first) {
        if let Some(day) = tokens
            .get(i + 1)
            .and_then(|t| parse_day_number(&t.word.to_lowercase()))
        {
            if let Some(date) = resolve_month_day(today, month, day) {
                return Some((2, date));
            }
        }
        return None;
    }

    match first.as_str() {
        "today" => return Some((1, today)),
        "tomorrow" => return Some((1, today + Duration::days(1))),
        "yesterday" => return Some((1, today - Duration::days(1))),
        _ => {}
    }

    // Bare weekday: nearest future occurrence, today included
    if let Some(target) = weekday_index(&first) {
        return Some((1, resolve_weekday(today, target, false)));
    }

    None
}

/// Match "at 5pm" / "at 17:00" (preferred) or a bare "5:30pm" token
fn match_time_at(tokens: &[Token<'_>], i: usize) -> Option<(usize, NaiveTime)> {
    let first = tokens.get(i)?.word.to_lowercase();

    if first == "at" {
        if let Some(time) = tokens
            .get(i + 1)
            .and_then(|t| parse_time_word(&t.word.to_lowercase()))
        {
            return Some((2, time));
        }
        return None;
    }

    parse_time_word(&first).map(|time| (1, time))
}

/// Days represented by one spelled-out offset unit
fn unit_days(word: &str) -> Option<i64> {
    match word {
        "day" | "days" => Some(1),
        "week" | "weeks" => Some(7),
        // Approximate: 30 days per month
        "month" | "months" => Some(30),
        _ => None,
    }
}

/// Compact offsets like "3d", "2w", "1m"
fn parse_compact_offset(word: &str, today: NaiveDate) -> Option<NaiveDate> {
    let unit = word.chars().last()?;
    let digits = &word[..word.len() - unit.len_utf8()];
    let n = digits.parse::<i64>().ok()?;
    let days_per_unit = match unit {
        'd' => 1,
        'w' => 7,
        'm' => 30,
        _ => return None,
    };
    Some(today + Duration::days(n * days_per_unit))
}

/// Weekday name to Monday-based index
fn weekday_index(word: &str) -> Option<u32> {
    match word {
        "monday" | "mon" => Some(0),
        "tuesday" | "tue" | "tues" => Some(1),
        "wednesday" | "wed" => Some(2),
        "thursday" | "thu" | "thur" | "thurs" => Some(3),
        "friday" | "fri" => Some(4),
        "saturday" | "sat" => Some(5),
        "sunday" | "sun" => Some(6),
        _ => None,
    }
}

/// Month name to 1-based index
fn month_index(word: &str) -> Option<u32> {
    match word {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

/// Day-of-month number, with an optional ordinal suffix ("3", "3rd", "21st")
fn parse_day_number(word: &str) -> Option<u32> {
    let digits = word
        .strip_suffix("st")
        .or_else(|| word.strip_suffix("nd"))
        .or_else(|| word.strip_suffix("rd"))
        .or_else(|| word.strip_suffix("th"))
        .unwrap_or(word);
    let day = digits.parse::<u32>().ok()?;
    if (1..=31).contains(&day) {
        Some(day)
    } else {
        None
    }
}

/// "5pm", "5:30pm", "12am", "17:00". Bare hour digits without am/pm or a
/// colon stay unmatched; they are far more often counts than times.
fn parse_time_word(word: &str) -> Option<NaiveTime> {
    if let Some(rest) = word.strip_suffix("am").or_else(|| word.strip_suffix("pm")) {
        let pm = word.ends_with("pm");
        let (hour_part, minute) = match rest.split_once(':') {
            Some((h, m)) => (h, m.parse::<u32>().ok()?),
            None => (rest, 0),
        };
        let hour = hour_part.parse::<u32>().ok()?;
        if !(1..=12).contains(&hour) || minute >= 60 {
            return None;
        }
        let hour24 = if pm { hour % 12 + 12 } else { hour % 12 };
        return NaiveTime::from_hms_opt(hour24, minute, 0);
    }

    if let Some((h, m)) = word.split_once(':') {
        if m.len() != 2 {
            return None;
        }
        let hour = h.parse::<u32>().ok()?;
        let minute = m.parse::<u32>().ok()?;
        if hour < 24 && minute < 60 {
            return NaiveTime::from_hms_opt(hour, minute, 0);
        }
    }

    None
}

/// Nearest occurrence of a weekday; today counts as a match. "next" always
/// lands in the following week.
fn resolve_weekday(today: NaiveDate, target: u32, next_week: bool) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let days_ahead = (target + 7 - current) % 7;
    let days_to_add = if next_week {
        if days_ahead == 0 {
            7
        } else {
            days_ahead + 7
        }
    } else {
        days_ahead
    };
    today + Duration::days(days_to_add as i64)
}

/// Month/day resolved to the nearest future occurrence; a day already past
/// this year rolls to next year
fn resolve_month_day(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Friday 2024-03-15, 10:30 local
    fn reference() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_tomorrow_keeps_reference_time() {
        let found = extract_date_phrase("Buy milk tomorrow", reference()).unwrap();
        assert_eq!(found.matched, "tomorrow");
        assert_eq!(found.resolved, reference() + Duration::days(1));
        assert_eq!(strip_phrase("Buy milk tomorrow", &found), "Buy milk");
    }

    #[test]
    fn test_no_date_phrase() {
        assert!(extract_date_phrase("Finish report", reference()).is_none());
        assert!(extract_date_phrase("Email Zain", reference()).is_none());
    }

    #[test]
    fn test_at_time_resolves_on_reference_date() {
        let found = extract_date_phrase("Call mom at 5pm", reference()).unwrap();
        assert_eq!(found.matched, "at 5pm");
        assert_eq!(found.resolved, local(2024, 3, 15, 17, 0));
        assert_eq!(strip_phrase("Call mom at 5pm", &found), "Call mom");
    }

    #[test]
    fn test_date_with_time_suffix_wins_as_longest_match() {
        let text = "leave tomorrow at 9am";
        let found = extract_date_phrase(text, reference()).unwrap();
        assert_eq!(found.matched, "tomorrow at 9am");
        assert_eq!(found.resolved, local(2024, 3, 16, 9, 0));
        assert_eq!(strip_phrase(text, &found), "leave");
    }

    #[test]
    fn test_bare_weekday_is_nearest_future_occurrence() {
        let found = extract_date_phrase("dentist monday", reference()).unwrap();
        assert_eq!(found.resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());

        // The reference day itself counts as a match
        let same_day = extract_date_phrase("standup friday", reference()).unwrap();
        assert_eq!(same_day.resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_next_weekday_lands_in_following_week() {
        let found = extract_date_phrase("review next monday", reference()).unwrap();
        assert_eq!(found.matched, "next monday");
        assert_eq!(found.resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 25).unwrap());

        let same_day = extract_date_phrase("plan next friday", reference()).unwrap();
        assert_eq!(same_day.resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 22).unwrap());
    }

    #[test]
    fn test_offset_phrases() {
        let days = extract_date_phrase("submit in 3 days", reference()).unwrap();
        assert_eq!(days.matched, "in 3 days");
        assert_eq!(days.resolved, reference() + Duration::days(3));

        let weeks = extract_date_phrase("renew in 2 weeks", reference()).unwrap();
        assert_eq!(weeks.resolved, reference() + Duration::days(14));

        let compact = extract_date_phrase("follow up in 3d", reference()).unwrap();
        assert_eq!(compact.matched, "in 3d");
        assert_eq!(compact.resolved, reference() + Duration::days(3));
    }

    #[test]
    fn test_month_day_rolls_to_next_year_when_past() {
        let past = extract_date_phrase("pay dues march 3", reference()).unwrap();
        assert_eq!(past.matched, "march 3");
        assert_eq!(past.resolved.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

        let ahead = extract_date_phrase("file taxes april 15th", reference()).unwrap();
        assert_eq!(ahead.matched, "april 15th");
        assert_eq!(ahead.resolved.date_naive(), NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    }

    #[test]
    fn test_twenty_four_hour_clock() {
        let found = extract_date_phrase("call supplier at 17:00", reference()).unwrap();
        assert_eq!(found.matched, "at 17:00");
        assert_eq!(found.resolved, local(2024, 3, 15, 17, 0));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let found = extract_date_phrase("Standup Tomorrow At 9AM", reference()).unwrap();
        assert_eq!(found.matched, "Tomorrow At 9AM");
        assert_eq!(found.resolved, local(2024, 3, 16, 9, 0));
    }

    #[test]
    fn test_twelve_hour_edge_cases() {
        assert_eq!(parse_time_word("12am"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_time_word("12pm"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(parse_time_word("5:30pm"), NaiveTime::from_hms_opt(17, 30, 0));
        assert_eq!(parse_time_word("13pm"), None);
        assert_eq!(parse_time_word("5"), None);
    }

    #[test]
    fn test_strip_phrase_trims_seam_punctuation() {
        let text = "Pay rent, tomorrow";
        let found = extract_date_phrase(text, reference()).unwrap();
        assert_eq!(strip_phrase(text, &found), "Pay rent");

        let middle = "book flights tomorrow for the trip";
        let found = extract_date_phrase(middle, reference()).unwrap();
        assert_eq!(strip_phrase(middle, &found), "book flights for the trip");
    }

    #[test]
    fn test_yesterday() {
        let found = extract_date_phrase("log what happened yesterday", reference()).unwrap();
        assert_eq!(found.resolved, reference() - Duration::days(1));
    }
}
