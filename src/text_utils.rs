use std::ops::Index;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

const WORDS_PER_MINUTE: usize = 265;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Accepts `2022-04-02 12:05:00.000`, `2022-04-02 12:05:00`, `2022-04-02T12:05:00` and `2022-04-02`.
/// Anything else around the date is an error.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r#"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(\.\d{0,3})?)?$"#
        ).unwrap();
    }

    let buf = buf.trim();
    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let (h, mn, s) = match (caps.get(4), caps.get(5), caps.get(6)) {
        (Some(h), Some(mn), Some(s)) => (to_u32(h.as_str())?, to_u32(mn.as_str())?, to_u32(s.as_str())?),
        _ => (0, 0, 0),
    };

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

pub fn format_date(date_time: &NaiveDateTime, date_format: &str) -> String {
    date_time.format(date_format).to_string()
}

/// Cuts `text` to at most `max_chars` characters on a word boundary and
/// appends an ellipsis when something was dropped.
pub fn prune_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let ends_on_word = text.chars().nth(max_chars).is_some_and(char::is_whitespace);
    let pruned = match cut.rfind(char::is_whitespace) {
        _ if ends_on_word => cut.trim_end(),
        Some(pos) if pos > 0 => cut[..pos].trim_end(),
        _ => cut.as_str(),
    };

    format!("{}…", pruned)
}

pub fn time_to_read(plain_text: &str) -> u32 {
    let words = plain_text.split_whitespace().count();
    let minutes = (words as f64 / WORDS_PER_MINUTE as f64).round() as u32;
    minutes.max(1)
}
