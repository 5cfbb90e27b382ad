//! Translation from a composed [`Email`] into the Mailtrap send-API body.
//!
//! Everything here is a pure function: the builder takes the message and its
//! resolved envelope and returns a fresh [`SendPayload`] value. Category
//! extraction and header filtering return new collections rather than
//! mutating the message.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use crate::message::{Address, Attachment, Email, Envelope, Header};

/// Reserved header carrying the Mailtrap analytics category. Extracted into
/// the top-level `category` field and never forwarded as a generic header.
pub const CATEGORY_HEADER: &str = "X-Mailtrap-Category";

/// Header names that are never forwarded through the generic `headers` map.
/// These are either structural (set by the API from dedicated payload
/// fields) or handled specially by the builder.
const RESERVED_HEADERS: &[&str] = &[
    CATEGORY_HEADER,
    "Reply-To",
    "Subject",
    "From",
    "To",
    "Cc",
    "Bcc",
    "Date",
    "Message-ID",
    "MIME-Version",
    "Content-Type",
];

/// JSON body for `POST /api/send`. Optional fields are omitted entirely when
/// unset, never serialized as null or an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendPayload {
    pub from: AddressPayload,
    pub to: Vec<AddressPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<AddressPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<AddressPayload>>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// `{email, name?}` — `name` appears only when the address carries a
/// non-empty display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressPayload {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentPayload {
    pub content: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub filename: String,
    pub disposition: String,
}

/// Format a single address for the payload.
pub fn format_address(address: &Address) -> AddressPayload {
    AddressPayload {
        email: address.email.clone(),
        name: address.display_name().map(str::to_owned),
    }
}

fn format_address_list(addresses: &[Address]) -> Vec<AddressPayload> {
    addresses.iter().map(format_address).collect()
}

/// Format a single attachment: content is always base64 text.
pub fn format_attachment(attachment: &Attachment) -> AttachmentPayload {
    AttachmentPayload {
        content: BASE64.encode(&attachment.content),
        media_type: format!("{}/{}", attachment.media_type, attachment.media_subtype),
        filename: attachment.filename.clone(),
        disposition: attachment.disposition.as_str().to_string(),
    }
}

/// Split the category header out of a header list.
///
/// Returns the category value (last occurrence wins if repeated) and the
/// remaining headers with every category header removed, so the value can
/// never appear both as `category` and as a generic header.
pub fn extract_category(headers: &[Header]) -> (Option<String>, Vec<Header>) {
    let mut category = None;
    let mut remaining = Vec::with_capacity(headers.len());
    for header in headers {
        if header.name == CATEGORY_HEADER {
            category = Some(header.value.clone());
        } else {
            remaining.push(header.clone());
        }
    }
    (category, remaining)
}

/// Collect the headers eligible for generic pass-through into a map.
/// Reserved names are dropped; repeated names keep the last-seen value.
pub fn filter_headers(headers: &[Header]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for header in headers {
        if !RESERVED_HEADERS.contains(&header.name.as_str()) {
            map.insert(header.name.clone(), header.value.clone());
        }
    }
    map
}

/// Build the request body for one send.
///
/// The steps run in a fixed order; later fragments may extend earlier ones
/// (Reply-To always lands after, and therefore wins over, generic headers).
pub fn build_payload(email: &Email, envelope: &Envelope) -> SendPayload {
    let (category, remaining) = extract_category(&email.headers);

    let mut headers = filter_headers(&remaining);
    if let Some(reply_to) = email.reply_to.first() {
        headers.insert("Reply-To".to_string(), reply_to.to_full_string());
    }

    SendPayload {
        from: format_address(&envelope.sender),
        to: format_address_list(&envelope.recipients),
        cc: (!email.cc.is_empty()).then(|| format_address_list(&email.cc)),
        bcc: (!email.bcc.is_empty()).then(|| format_address_list(&email.bcc)),
        subject: email.subject.clone(),
        text: email.text.clone(),
        html: email.html.clone(),
        attachments: (!email.attachments.is_empty())
            .then(|| email.attachments.iter().map(format_attachment).collect()),
        category,
        headers: (!headers.is_empty()).then_some(headers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Disposition;
    use base64::Engine as _;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn simple_email() -> Email {
        Email::new(Address::new("sender@example.com"), "S")
            .to(Address::new("r@x.com"))
    }

    fn to_json(email: &Email) -> Value {
        let payload = build_payload(email, &email.envelope());
        serde_json::to_value(&payload).expect("Should serialize payload")
    }

    #[test]
    fn test_text_only_message() {
        let email = simple_email().text("hi");
        let json = to_json(&email);

        assert_eq!(json["text"], "hi");
        assert_eq!(json["subject"], "S");
        assert_eq!(json["to"], json!([{"email": "r@x.com"}]));
        assert!(json.get("html").is_none());
    }

    #[test]
    fn test_text_and_html_coexist() {
        let email = simple_email().text("plain").html("<p>rich</p>");
        let json = to_json(&email);

        assert_eq!(json["text"], "plain");
        assert_eq!(json["html"], "<p>rich</p>");
    }

    #[test]
    fn test_no_body_omits_both_keys() {
        let json = to_json(&simple_email());
        assert!(json.get("text").is_none());
        assert!(json.get("html").is_none());
    }

    #[test]
    fn test_empty_cc_bcc_keys_absent() {
        let json = to_json(&simple_email());
        assert!(json.get("cc").is_none());
        assert!(json.get("bcc").is_none());
    }

    #[test]
    fn test_cc_and_bcc_populated_independently() {
        let email = simple_email().cc(Address::new("cc@x.com"));
        let json = to_json(&email);

        assert_eq!(json["cc"], json!([{"email": "cc@x.com"}]));
        assert!(json.get("bcc").is_none());
    }

    #[test]
    fn test_display_name_included_when_present() {
        let addr = format_address(&Address::with_name("a@x.com", "Alice"));
        assert_eq!(
            serde_json::to_value(&addr).unwrap(),
            json!({"email": "a@x.com", "name": "Alice"})
        );
    }

    #[test]
    fn test_empty_display_name_never_serialized() {
        let addr = format_address(&Address::with_name("a@x.com", ""));
        assert_eq!(serde_json::to_value(&addr).unwrap(), json!({"email": "a@x.com"}));
    }

    #[test]
    fn test_category_header_moved_to_top_level() {
        let email = simple_email()
            .header("X-Mailtrap-Category", "signup")
            .header("X-Custom", "1");
        let json = to_json(&email);

        assert_eq!(json["category"], "signup");
        assert!(json["headers"].get("X-Mailtrap-Category").is_none());
        assert_eq!(json["headers"]["X-Custom"], "1");
    }

    #[test]
    fn test_extract_category_is_a_pure_split() {
        let headers = vec![
            Header::new("X-A", "1"),
            Header::new(CATEGORY_HEADER, "first"),
            Header::new("X-B", "2"),
            Header::new(CATEGORY_HEADER, "second"),
        ];

        let (category, remaining) = extract_category(&headers);
        assert_eq!(category.as_deref(), Some("second"));
        assert_eq!(remaining, vec![Header::new("X-A", "1"), Header::new("X-B", "2")]);
        // input untouched
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_reserved_headers_not_forwarded() {
        let email = simple_email()
            .header("Subject", "shadow")
            .header("Content-Type", "text/weird")
            .header("Message-ID", "<x@y>")
            .header("X-Keep", "yes");
        let json = to_json(&email);

        assert_eq!(json["headers"], json!({"X-Keep": "yes"}));
    }

    #[test]
    fn test_repeated_header_last_value_wins() {
        let email = simple_email()
            .header("X-Tag", "first")
            .header("X-Tag", "second");
        let json = to_json(&email);

        assert_eq!(json["headers"]["X-Tag"], "second");
    }

    #[test]
    fn test_no_custom_headers_key_absent() {
        let json = to_json(&simple_email());
        assert!(json.get("headers").is_none());
    }

    #[test]
    fn test_reply_to_sets_headers_even_when_otherwise_empty() {
        let email = simple_email().reply_to(Address::with_name("r@y.com", "Replies"));
        let json = to_json(&email);

        assert_eq!(json["headers"], json!({"Reply-To": "Replies <r@y.com>"}));
    }

    #[test]
    fn test_first_reply_to_wins() {
        let email = simple_email()
            .reply_to(Address::new("first@y.com"))
            .reply_to(Address::new("second@y.com"))
            .header("X-Other", "v");
        let json = to_json(&email);

        assert_eq!(json["headers"]["Reply-To"], "first@y.com");
        assert_eq!(json["headers"]["X-Other"], "v");
    }

    #[test]
    fn test_attachment_content_is_base64_of_raw_bytes() {
        let bytes = vec![0u8, 159, 146, 150, 255];
        let email = simple_email().attachment(Attachment::new(
            bytes.clone(),
            "application",
            "octet-stream",
            "blob.bin",
        ));
        let json = to_json(&email);

        let content = json["attachments"][0]["content"]
            .as_str()
            .expect("Should be a string");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(content)
            .expect("Should decode");
        assert_eq!(decoded, bytes);
        assert_eq!(json["attachments"][0]["type"], "application/octet-stream");
        assert_eq!(json["attachments"][0]["filename"], "blob.bin");
        assert_eq!(json["attachments"][0]["disposition"], "attachment");
    }

    #[test]
    fn test_attachment_order_preserved() {
        let email = simple_email()
            .attachment(Attachment::new(b"a".to_vec(), "text", "plain", "a.txt"))
            .attachment(
                Attachment::new(b"b".to_vec(), "image", "png", "b.png").inline(),
            );
        let json = to_json(&email);

        assert_eq!(json["attachments"][0]["filename"], "a.txt");
        assert_eq!(json["attachments"][1]["filename"], "b.png");
        assert_eq!(json["attachments"][1]["disposition"], "inline");
    }

    #[test]
    fn test_no_attachments_key_absent() {
        let json = to_json(&simple_email());
        assert!(json.get("attachments").is_none());
    }

    #[test]
    fn test_inline_disposition_serialized() {
        let attachment =
            Attachment::new(b"img".to_vec(), "image", "png", "logo.png").inline();
        assert_eq!(attachment.disposition, Disposition::Inline);
        assert_eq!(format_attachment(&attachment).disposition, "inline");
    }

    #[test]
    fn test_builder_is_deterministic() {
        let email = simple_email()
            .text("body")
            .cc(Address::new("cc@x.com"))
            .header("X-Mailtrap-Category", "cat")
            .header("X-B", "2")
            .header("X-A", "1")
            .reply_to(Address::new("reply@x.com"))
            .attachment(Attachment::new(b"data".to_vec(), "text", "plain", "f.txt"));
        let envelope = email.envelope();

        let first = serde_json::to_vec(&build_payload(&email, &envelope)).unwrap();
        let second = serde_json::to_vec(&build_payload(&email, &envelope)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_follows_envelope_not_display_fields() {
        let email = Email::new(Address::new("display@x.com"), "S")
            .to(Address::new("shown@x.com"))
            .with_envelope(Envelope::new(
                Address::new("bounce@x.com"),
                vec![Address::new("actual@x.com")],
            ));
        let json = to_json(&email);

        assert_eq!(json["from"], json!({"email": "bounce@x.com"}));
        assert_eq!(json["to"], json!([{"email": "actual@x.com"}]));
    }

    #[test]
    fn test_subject_passed_through_verbatim() {
        let email = Email::new(Address::new("s@x.com"), "Héllo ünïcode ✓")
            .to(Address::new("r@x.com"));
        let json = to_json(&email);
        assert_eq!(json["subject"], "Héllo ünïcode ✓");
    }
}
