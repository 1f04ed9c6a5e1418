//! Newsletter subscriber CSV export.

use chrono::{DateTime, Utc};

use crate::models::subscriber::NewsletterSubscriber;

pub const CSV_HEADER: &str = "Email,Signup Date,Status,Last Sent";

/// Dates are rendered date-only, day first, as the Belgian admin team reads them
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Render subscribers as CSV, one row per subscriber in the given order.
///
/// Lines end with `\r\n` and fields are quoted per RFC 4180 when needed.
pub fn subscribers_to_csv(subscribers: &[NewsletterSubscriber]) -> String {
    let mut out = String::with_capacity(64 * (subscribers.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for subscriber in subscribers {
        let row = [
            escape_field(&subscriber.email),
            format_date(&subscriber.created_at),
            subscriber.status_label().to_string(),
            subscriber
                .last_sent_at
                .as_ref()
                .map(format_date)
                .unwrap_or_default(),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }

    out
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Quote a field when it contains a separator, quote or line break
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn subscriber(email: &str, confirmed: bool) -> NewsletterSubscriber {
        NewsletterSubscriber {
            id: Some(1),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 0, 0).unwrap(),
            confirmed,
            last_sent_at: None,
        }
    }

    #[test]
    fn test_empty_export_has_header_only() {
        assert_eq!(subscribers_to_csv(&[]), "Email,Signup Date,Status,Last Sent\r\n");
    }

    #[test]
    fn test_rows_in_order() {
        let mut sent = subscriber("bob@example.com", true);
        sent.last_sent_at = Some(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());

        let csv = subscribers_to_csv(&[subscriber("alice@example.com", false), sent]);

        assert_eq!(
            csv,
            "Email,Signup Date,Status,Last Sent\r\n\
             alice@example.com,05/03/2024,unsubscribed,\r\n\
             bob@example.com,05/03/2024,subscribed,01/04/2024\r\n"
        );
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain@example.com"), "plain@example.com");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }
}
