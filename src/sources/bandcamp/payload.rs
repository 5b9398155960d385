use std::borrow::Cow;

use serde_json::Value;

use super::{BandcampError, PayloadKind};

const TRALBUM_OPEN: &str = "data-tralbum=\"";
const TRALBUM_CLOSE: char = '"';

/// Pulls the JSON stored in the page's `data-tralbum` attribute.
///
/// Only `&quot;` is decoded: the site encodes the JSON quotes that way and
/// nothing else inside the attribute needs unescaping.
pub fn read_tralbum(page: &str, kind: PayloadKind) -> Result<Value, BandcampError> {
    let raw = extract_between(page, TRALBUM_OPEN, TRALBUM_CLOSE)
        .ok_or(BandcampError::MissingPayload(kind))?;

    let json = raw.replace("&quot;", "\"");
    Ok(serde_json::from_str(&json)?)
}

fn extract_between<'a>(text: &'a str, start: &str, end: char) -> Option<&'a str> {
    let begin = text.find(start)? + start.len();
    let len = text[begin..].find(end)?;
    Some(&text[begin..begin + len])
}

/// Typed reads over the parsed payload. Each returns `None` when the field is
/// missing, null, or of an unusable type.
pub trait PayloadExt {
    /// Text form of a string or number field.
    fn text(&self, key: &str) -> Option<Cow<'_, str>>;
    fn number(&self, key: &str) -> Option<f64>;
    fn array(&self, key: &str) -> Option<&[Value]>;
}

impl PayloadExt for Value {
    fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn array(&self, key: &str) -> Option<&[Value]> {
        self.get(key)?.as_array().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_quoted_attribute() {
        let page = r#"<div id="pagedata" data-blob="{}"></div>
            <script data-tralbum="{&quot;artist&quot;:&quot;A&quot;,&quot;art_id&quot;:5}" data-other="x"></script>"#;

        let payload = read_tralbum(page, PayloadKind::Track).unwrap();
        assert_eq!(payload, json!({"artist": "A", "art_id": 5}));
    }

    #[test]
    fn first_attribute_wins() {
        let page = r#"<a data-tralbum="{&quot;n&quot;:1}"></a><a data-tralbum="{&quot;n&quot;:2}"></a>"#;
        let payload = read_tralbum(page, PayloadKind::Album).unwrap();
        assert_eq!(payload["n"], 1);
    }

    #[test]
    fn only_quote_entity_is_decoded() {
        let page = r#"<a data-tralbum="{&quot;title&quot;:&quot;Rock &amp; Roll&quot;}">"#;
        let payload = read_tralbum(page, PayloadKind::Track).unwrap();
        assert_eq!(payload["title"], "Rock &amp; Roll");
    }

    #[test]
    fn missing_attribute_is_reported_per_kind() {
        let page = "<html><body>This page is gone.</body></html>";

        assert!(matches!(
            read_tralbum(page, PayloadKind::Track),
            Err(BandcampError::MissingPayload(PayloadKind::Track))
        ));
        assert!(matches!(
            read_tralbum(page, PayloadKind::Album),
            Err(BandcampError::MissingPayload(PayloadKind::Album))
        ));
    }

    #[test]
    fn unterminated_attribute_is_missing() {
        let page = "<a data-tralbum=\"{&quot;artist&quot;:";
        assert!(matches!(
            read_tralbum(page, PayloadKind::Track),
            Err(BandcampError::MissingPayload(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let page = r#"<a data-tralbum="{&quot;artist&quot;:}">"#;
        assert!(matches!(
            read_tralbum(page, PayloadKind::Track),
            Err(BandcampError::Json(_))
        ));
    }

    #[test]
    fn typed_reads() {
        let payload = json!({
            "artist": "A",
            "art_id": 1234567,
            "duration": 61.5,
            "padded": "2.25",
            "nothing": null,
            "trackinfo": [{"title": "T"}],
        });

        assert_eq!(payload.text("artist").as_deref(), Some("A"));
        assert_eq!(payload.text("art_id").as_deref(), Some("1234567"));
        assert_eq!(payload.text("nothing"), None);
        assert_eq!(payload.text("missing"), None);
        assert_eq!(payload.text("trackinfo"), None);

        assert_eq!(payload.number("duration"), Some(61.5));
        assert_eq!(payload.number("padded"), Some(2.25));
        assert_eq!(payload.number("artist"), None);

        assert_eq!(payload.array("trackinfo").map(<[Value]>::len), Some(1));
        assert_eq!(payload.array("artist"), None);
    }
}
