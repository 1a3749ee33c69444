//! Gmail header normalization
//!
//! Converts fetched message headers into [`MessageSummary`] records.

use chrono::{DateTime, FixedOffset, Weekday};

use crate::models::{MessageHeaders, MessageId, MessageSummary};

/// Shown when a message has no Subject header
pub const NO_SUBJECT: &str = "(no subject)";
/// Shown when a message has no From header
pub const NO_SENDER: &str = "(no sender)";

/// Headers fetched for each search hit
pub const SUMMARY_HEADERS: [&str; 3] = ["subject", "from", "date"];

/// Gmail web UI link prefix; the message ID is appended
const WEB_MESSAGE_URL: &str = "https://mail.google.com/mail/u/0/#inbox/";

/// Build the display record for one message
pub fn summarize(id: &MessageId, headers: &MessageHeaders) -> MessageSummary {
    MessageSummary {
        id: id.clone(),
        subject: headers.get_or("subject", NO_SUBJECT).to_string(),
        from: headers.get_or("from", NO_SENDER).to_string(),
        date: format_header_date(headers.get_or("date", "")),
        url: message_url(id),
    }
}

/// Gmail web link for a message
pub fn message_url(id: &MessageId) -> String {
    format!("{}{}", WEB_MESSAGE_URL, id.as_str())
}

/// Format a Date header as `YYYY-MM-DD HH:MM` in its own offset
///
/// Returns the header unchanged when it cannot be parsed.
pub fn format_header_date(raw: &str) -> String {
    match parse_header_date(raw) {
        Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}

/// Parse an RFC 2822 style Date header: `Wkd, DD Mon YYYY HH:MM:SS ±ZZZZ`
///
/// A trailing parenthesized zone name such as `(PDT)` is ignored. The weekday
/// must be a three-letter abbreviation followed by `", "`; it is not checked
/// against the date.
pub fn parse_header_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let without_zone_name = raw.split(" (").next()?.trim();
    let (weekday, rest) = without_zone_name.split_once(", ")?;
    if weekday.len() != 3 {
        return None;
    }
    weekday.parse::<Weekday>().ok()?;

    DateTime::parse_from_str(rest, "%d %b %Y %H:%M:%S %z").ok()
}
