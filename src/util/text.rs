//! Text helpers for presenting upstream HTML fragments as plain text.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Remove markup tags and character entities from an HTML fragment.
///
/// Entities are dropped, not decoded. A `<` or `&` with no closing
/// delimiter is kept as text.
pub fn strip_html(html: &str) -> String {
    let without_tags = strip_delimited(html, '<', '>', 0);
    strip_delimited(&without_tags, '&', ';', 1)
}

fn strip_delimited(input: &str, open: char, close: char, min_inner: usize) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len_utf8()..];
        match after_open.find(close) {
            Some(end) if end >= min_inner => {
                rest = &after_open[end + close.len_utf8()..];
            }
            _ => {
                out.push(open);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Render an upstream timestamp as a long-form date, e.g. `March 15, 2024`.
///
/// Accepts the upstream local form (`2024-03-15T10:00:00`), RFC 3339, or a
/// bare date.
pub fn format_date(value: &str) -> Option<String> {
    let value = value.trim();
    let date = PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .map(PrimitiveDateTime::date)
    .or_else(|_| OffsetDateTime::parse(value, &Rfc3339).map(OffsetDateTime::date))
    .or_else(|_| Date::parse(value, format_description!("[year]-[month]-[day]")))
    .ok()?;

    date.format(format_description!(
        "[month repr:long] [day padding:none], [year]"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_and_entities_are_removed() {
        assert_eq!(
            strip_html("<p>Hazy &amp; juicy<br/> IPA&#8217;s</p>\n"),
            "Hazy  juicy IPAs\n"
        );
    }

    #[test]
    fn unclosed_delimiters_are_kept() {
        assert_eq!(strip_html("5 < 6 & 7"), "5 < 6 & 7");
        assert_eq!(strip_html("a && b;"), "a ");
    }

    #[test]
    fn empty_entity_is_not_an_entity() {
        assert_eq!(strip_html("fish &; chips"), "fish &; chips");
    }

    #[test]
    fn wordpress_dates_render_long_form() {
        assert_eq!(
            format_date("2024-03-05T10:00:00").as_deref(),
            Some("March 5, 2024")
        );
        assert_eq!(
            format_date("2023-12-31T23:59:59Z").as_deref(),
            Some("December 31, 2023")
        );
        assert_eq!(format_date("2022-07-04").as_deref(), Some("July 4, 2022"));
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert_eq!(format_date("yesterday"), None);
    }
}
