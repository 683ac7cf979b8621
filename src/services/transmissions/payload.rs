//! Conversion of a [`Transmission`] into the payload SparkPost accepts.
//!
//! Inline recipient addresses are normalized to objects, and the `cc` and
//! `bcc` convenience lists are folded into `recipients`. Each folded entry
//! carries a `header_to` naming the primary recipients, and CC entries
//! also produce a `CC` content header.

use std::collections::BTreeMap;

use crate::types::address::{format_address, Address};
use crate::types::transmission::{Content, Recipient, Recipients, Transmission};

const CC_HEADER: &str = "CC";
const ADDRESS_SEPARATOR: &str = ", ";

/// Builds the wire payload for `transmission`.
///
/// The input is left untouched. Transmissions addressed to a stored list,
/// or without recipients, are returned as-is, `cc` and `bcc` included.
pub fn build_payload(transmission: &Transmission) -> Transmission {
    let mut payload = transmission.clone();

    let mut recipients = match payload.recipients.take() {
        Some(Recipients::Inline(recipients)) => recipients,
        other => {
            if payload.cc.is_some() || payload.bcc.is_some() {
                tracing::warn!("cc/bcc lists are only expanded for inline recipients");
            }
            payload.recipients = other;
            return payload;
        }
    };

    recipients = recipients.into_iter().map(normalize_recipient).collect();

    let cc = payload.cc.take().unwrap_or_default();
    let bcc = payload.bcc.take().unwrap_or_default();

    if !cc.is_empty() {
        let header = join_addresses(cc.iter().map(|recipient| &recipient.address));
        payload
            .content
            .get_or_insert_with(Content::default)
            .headers
            .get_or_insert_with(BTreeMap::new)
            .insert(CC_HEADER.to_string(), header);
    }

    let header_to = join_addresses(
        recipients
            .iter()
            .map(|recipient| &recipient.address)
            .filter(|address| !address.has_header_to()),
    );

    tracing::debug!(
        recipients = recipients.len(),
        cc = cc.len(),
        bcc = bcc.len(),
        "Building transmission payload"
    );

    recipients.extend(
        cc.into_iter()
            .chain(bcc)
            .map(|recipient| copy_recipient(recipient, &header_to)),
    );

    payload.recipients = Some(Recipients::Inline(recipients));
    payload
}

fn normalize_recipient(mut recipient: Recipient) -> Recipient {
    recipient.address = Address::Structured(recipient.address.into_structured());
    recipient
}

/// Turns a CC or BCC entry into a recipient addressed with `header_to`.
fn copy_recipient(recipient: Recipient, header_to: &str) -> Recipient {
    let mut address = recipient.address.into_structured();
    address.header_to = Some(header_to.to_string());
    address.name = None;

    Recipient {
        address: Address::Structured(address),
        ..recipient
    }
}

fn join_addresses<'a>(addresses: impl Iterator<Item = &'a Address>) -> String {
    addresses
        .map(format_address)
        .collect::<Vec<_>>()
        .join(ADDRESS_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::address::EmailAddress;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn transmission(value: Value) -> Transmission {
        Transmission::try_from(value).unwrap()
    }

    fn payload_json(value: Value) -> Value {
        serde_json::to_value(build_payload(&transmission(value))).unwrap()
    }

    fn cc_transmission() -> Value {
        json!({
            "recipients": [
                { "address": "\"Bob\" <recipient1@gmail.com>" },
                { "address": { "email": "recipient2@gmail.com", "name": "Bertha" } },
                { "address": { "email": "recipient3@gmail.com" } },
                { "address": "recipient4@gmail.com" }
            ],
            "cc": [
                { "address": "\"John\" <cc1@gmail.com>" },
                { "address": { "email": "cc2@gmail.com", "name": "Jane" } }
            ],
            "content": { "template_id": "hello-world" }
        })
    }

    const EXPECTED_HEADER_TO: &str = "\"Bob\" <recipient1@gmail.com>, \"Bertha\" <recipient2@gmail.com>, recipient3@gmail.com, recipient4@gmail.com";

    fn expected_recipients() -> Value {
        json!([
            { "address": { "email": "recipient1@gmail.com", "name": "Bob" } },
            { "address": { "email": "recipient2@gmail.com", "name": "Bertha" } },
            { "address": { "email": "recipient3@gmail.com" } },
            { "address": { "email": "recipient4@gmail.com" } },
            { "address": { "email": "cc1@gmail.com", "header_to": EXPECTED_HEADER_TO } },
            { "address": { "email": "cc2@gmail.com", "header_to": EXPECTED_HEADER_TO } }
        ])
    }

    #[test]
    fn test_cc_converted_to_recipients_and_header() {
        let payload = payload_json(cc_transmission());

        assert_eq!(payload["recipients"], expected_recipients());
        assert_eq!(
            payload["content"],
            json!({
                "template_id": "hello-world",
                "headers": { "CC": "\"John\" <cc1@gmail.com>, \"Jane\" <cc2@gmail.com>" }
            })
        );
        assert!(payload.get("cc").is_none());
        assert!(payload.get("bcc").is_none());
    }

    #[test]
    fn test_bcc_converted_to_recipients_without_header() {
        let mut input = cc_transmission();
        let cc = input["cc"].take();
        input["bcc"] = cc;
        input.as_object_mut().unwrap().remove("cc");

        let payload = payload_json(input);

        assert_eq!(payload["recipients"], expected_recipients());
        assert_eq!(payload["content"], json!({ "template_id": "hello-world" }));
        assert!(payload.get("bcc").is_none());
    }

    #[test]
    fn test_single_recipient_with_cc() {
        let payload = payload_json(json!({
            "recipients": [{ "address": { "name": "Bob", "email": "r1@x.com" } }],
            "cc": [{ "address": "t@test.com" }],
            "bcc": []
        }));

        assert_eq!(payload["content"]["headers"]["CC"], "t@test.com");
        assert_eq!(payload["recipients"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            payload["recipients"][1]["address"],
            json!({ "email": "t@test.com", "header_to": "\"Bob\" <r1@x.com>" })
        );
        assert!(payload.get("cc").is_none());
        assert!(payload.get("bcc").is_none());
    }

    #[test]
    fn test_stored_list_left_untouched() {
        let input = json!({
            "recipients": { "list_id": "my-list" },
            "cc": [{ "address": "cc@example.com" }],
            "content": { "template_id": "my-template" }
        });

        assert_eq!(payload_json(input.clone()), input);
    }

    #[test]
    fn test_missing_recipients_left_untouched() {
        let input = json!({ "content": { "template_id": "my-template" } });
        assert_eq!(payload_json(input.clone()), input);
    }

    #[test]
    fn test_existing_header_to_excluded_from_new_header_to() {
        let payload = payload_json(json!({
            "recipients": [
                { "address": { "email": "to@example.com", "name": "To" } },
                { "address": { "email": "old-cc@example.com", "header_to": "to@example.com" } }
            ],
            "cc": [{ "address": "new-cc@example.com" }]
        }));

        assert_eq!(
            payload["recipients"][2]["address"],
            json!({ "email": "new-cc@example.com", "header_to": "\"To\" <to@example.com>" })
        );
        assert_eq!(
            payload["recipients"][1]["address"]["header_to"],
            "to@example.com"
        );
    }

    #[test]
    fn test_output_order_recipients_then_cc_then_bcc() {
        let payload = payload_json(json!({
            "recipients": [{ "address": "r1@x.com" }, { "address": "r2@x.com" }],
            "bcc": [{ "address": "b1@x.com" }, { "address": "b2@x.com" }],
            "cc": [{ "address": "c1@x.com" }, { "address": "c2@x.com" }]
        }));

        let emails: Vec<&str> = payload["recipients"]
            .as_array()
            .unwrap()
            .iter()
            .map(|recipient| recipient["address"]["email"].as_str().unwrap())
            .collect();

        assert_eq!(
            emails,
            vec!["r1@x.com", "r2@x.com", "c1@x.com", "c2@x.com", "b1@x.com", "b2@x.com"]
        );
    }

    #[test]
    fn test_empty_cc_and_bcc_ignored() {
        let payload = payload_json(json!({
            "recipients": [{ "address": { "email": "r@x.com" } }],
            "cc": [],
            "bcc": [],
            "content": { "subject": "Hi" }
        }));

        assert_eq!(
            payload,
            json!({
                "recipients": [{ "address": { "email": "r@x.com" } }],
                "content": { "subject": "Hi" }
            })
        );
    }

    #[test]
    fn test_empty_cc_does_not_create_content() {
        let payload = payload_json(json!({
            "recipients": [{ "address": "r@x.com" }],
            "cc": []
        }));

        assert!(payload.get("content").is_none());
    }

    #[test]
    fn test_cc_creates_content_when_missing() {
        let payload = build_payload(
            &Transmission::builder()
                .recipient("r@x.com")
                .cc("test@test.com")
                .build(),
        );

        let headers = payload.content.and_then(|content| content.headers).unwrap();
        assert_eq!(headers.get(CC_HEADER).map(String::as_str), Some("test@test.com"));
    }

    #[test]
    fn test_cc_keeps_existing_headers() {
        let payload = payload_json(json!({
            "recipients": [{ "address": "r@x.com" }],
            "cc": [{ "address": "test@test.com" }],
            "bcc": [],
            "content": { "headers": { "X-Campaign": "spring" }, "subject": "Hi" }
        }));

        assert_eq!(
            payload["content"],
            json!({
                "headers": { "X-Campaign": "spring", "CC": "test@test.com" },
                "subject": "Hi"
            })
        );
    }

    #[test]
    fn test_cc_recipient_keeps_passthrough_fields() {
        let payload = payload_json(json!({
            "recipients": [{ "address": { "email": "o@example.com", "name": "Original" } }],
            "cc": [{
                "address": { "email": "cc@example.com", "name": "Carbon Copy" },
                "substitution_data": { "recipient_type": "CC" }
            }]
        }));

        assert_eq!(
            payload["recipients"][1],
            json!({
                "address": { "email": "cc@example.com", "header_to": "\"Original\" <o@example.com>" },
                "substitution_data": { "recipient_type": "CC" }
            })
        );
        assert_eq!(payload["content"]["headers"]["CC"], "\"Carbon Copy\" <cc@example.com>");
    }

    #[test]
    fn test_full_cc_syntax_unchanged() {
        let input = json!({
            "recipients": [
                {
                    "address": { "email": "original.recipient@example.com", "name": "Original Recipient" },
                    "substitution_data": { "recipient_type": "Original" }
                },
                {
                    "address": {
                        "email": "bcc.recipient@example.com",
                        "header_to": "\"Original Recipient\" <original.recipient@example.com>"
                    },
                    "substitution_data": { "recipient_type": "BCC" }
                }
            ],
            "content": {
                "from": { "name": "BCC Test", "email": "from@example.com" },
                "subject": "Example email using bcc",
                "text": "An example email using bcc",
                "html": "<p>An example email using bcc</p>"
            }
        });

        assert_eq!(payload_json(input.clone()), input);
    }

    #[test]
    fn test_unknown_address_fields_pass_through() {
        let input = json!({
            "recipients": [{ "address": { "email": "a@b.com", "name": "A", "x_extra": 1 } }]
        });

        assert_eq!(payload_json(input.clone()), input);
    }

    #[test]
    fn test_cc_address_keeps_unknown_fields() {
        let payload = payload_json(json!({
            "recipients": [{ "address": "to@example.com" }],
            "cc": [{ "address": { "email": "cc@example.com", "name": "Carla", "x_extra": 1 } }]
        }));

        assert_eq!(
            payload["recipients"][1]["address"],
            json!({ "email": "cc@example.com", "header_to": "to@example.com", "x_extra": 1 })
        );
    }

    #[test]
    fn test_stored_list_with_numeric_id_left_untouched() {
        let input = json!({
            "recipients": { "list_id": 12345 },
            "bcc": [{ "address": "bcc@example.com" }]
        });

        assert_eq!(payload_json(input.clone()), input);
    }

    #[test]
    fn test_rfc822_content_preserved() {
        let input = json!({
            "recipients": [{ "address": { "email": "john.doe@example.com" } }],
            "content": {
                "email_rfc822": "Content-Type: text/plain\nFrom: From Envelope <from@example.com>\nSubject: Example Email\n\nHello World"
            }
        });

        assert_eq!(payload_json(input.clone()), input);
    }

    #[test]
    fn test_input_not_mutated() {
        let input = transmission(cc_transmission());
        let snapshot = input.clone();

        let payload = build_payload(&input);

        assert_eq!(input, snapshot);
        assert_ne!(payload, input);
        assert!(input.cc.is_some());
    }

    #[test]
    fn test_every_inline_address_structured() {
        let payload = build_payload(&transmission(cc_transmission()));

        let recipients = payload
            .recipients
            .as_ref()
            .and_then(Recipients::as_inline)
            .unwrap();

        assert!(recipients
            .iter()
            .all(|recipient| matches!(recipient.address, Address::Structured(_))));
        assert_eq!(
            recipients
                .iter()
                .filter(|recipient| recipient.address.has_header_to())
                .count(),
            2
        );
    }

    #[test]
    fn test_copy_recipient_drops_name() {
        let recipient = Recipient::new(EmailAddress::new("cc@example.com").with_name("Carla"));

        let copy = copy_recipient(recipient, "to@example.com");

        assert_eq!(
            copy.address,
            Address::Structured(EmailAddress::new("cc@example.com").with_header_to("to@example.com"))
        );
    }
}
