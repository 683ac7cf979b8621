//! Email address parsing and formatting.
//!
//! SparkPost accepts a recipient address either as a structured object
//! (`{"email": ..., "name": ..., "header_to": ...}`) or as a single string
//! such as `"Jane Doe" <jane@example.com>`. Parsing is best-effort: input
//! that does not look like `name <email>` is taken as a bare email.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Optional (possibly quoted) display name followed by `<email>`.
const NAMED_ADDRESS_PATTERN: &str = r#""?([^"<]*)"?\s*<(.+)>"#;

fn named_address_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(NAMED_ADDRESS_PATTERN).ok())
        .as_ref()
}

/// Structured email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Email address (e.g., "jane@example.com").
    pub email: String,
    /// Display name (e.g., "Jane Doe").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value SparkPost renders in the `To` header for this recipient.
    ///
    /// Only set on recipients that came from a CC or BCC list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_to: Option<String>,
    /// Any other address fields, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmailAddress {
    /// Creates an address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            header_to: None,
            extra: Map::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the `header_to` value.
    pub fn with_header_to(mut self, header_to: impl Into<String>) -> Self {
        self.header_to = Some(header_to.into());
        self
    }

    /// Formats the address for email headers: `"name" <email>`, or the
    /// bare email when there is no name.
    pub fn to_header(&self) -> String {
        match &self.name {
            Some(name) => format!("\"{}\" <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header())
    }
}

impl FromStr for EmailAddress {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_address(s))
    }
}

/// Address in either of the forms SparkPost accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    /// Structured address object.
    Structured(EmailAddress),
    /// Free-form string, `"name" <email>` or a bare email.
    Formatted(String),
}

impl Address {
    /// Converts to the structured form, parsing formatted strings.
    pub fn into_structured(self) -> EmailAddress {
        match self {
            Address::Structured(address) => address,
            Address::Formatted(input) => parse_address(&input),
        }
    }

    /// Returns true if this is a structured address carrying `header_to`.
    pub fn has_header_to(&self) -> bool {
        matches!(
            self,
            Address::Structured(EmailAddress {
                header_to: Some(_),
                ..
            })
        )
    }
}

impl From<EmailAddress> for Address {
    fn from(address: EmailAddress) -> Self {
        Address::Structured(address)
    }
}

impl From<&str> for Address {
    fn from(input: &str) -> Self {
        Address::Formatted(input.to_string())
    }
}

impl From<String> for Address {
    fn from(input: String) -> Self {
        Address::Formatted(input)
    }
}

/// Parses `"Name" <email>`, `Name <email>` or a bare email.
///
/// A quoted display name is kept exactly as written. An unquoted one is
/// trimmed and dropped when empty. Input without an angle-bracketed part is
/// returned whole as the email. Never fails.
pub fn parse_address(input: &str) -> EmailAddress {
    let captures = named_address_regex().and_then(|re| re.captures(input));

    match captures {
        Some(caps) => {
            let name = caps.get(1).and_then(|m| {
                let quoted =
                    input[..m.start()].ends_with('"') && input[m.end()..].starts_with('"');
                let name = if quoted { m.as_str() } else { m.as_str().trim() };
                (quoted || !name.is_empty()).then(|| name.to_string())
            });
            let email = caps.get(2).map_or("", |m| m.as_str());

            EmailAddress {
                name,
                ..EmailAddress::new(email)
            }
        }
        None => EmailAddress::new(input),
    }
}

/// Formats an address for use in a header value.
///
/// Formatted strings are returned unchanged.
pub fn format_address(address: &Address) -> String {
    match address {
        Address::Structured(address) => address.to_header(),
        Address::Formatted(input) => input.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(r#""Bob" <bob@example.com>"#, Some("Bob"), "bob@example.com" ; "quoted name")]
    #[test_case("Bob Smith <bob@example.com>", Some("Bob Smith"), "bob@example.com" ; "unquoted name")]
    #[test_case(r#""Smith, Bob"<bob@example.com>"#, Some("Smith, Bob"), "bob@example.com" ; "comma in quoted name")]
    #[test_case(r#"" Bob " <bob@example.com>"#, Some(" Bob "), "bob@example.com" ; "spaces inside quotes kept")]
    #[test_case("  Bob   <bob@example.com>", Some("Bob"), "bob@example.com" ; "unquoted name trimmed")]
    #[test_case("<bob@example.com>", None, "bob@example.com" ; "brackets without name")]
    #[test_case("bob@example.com", None, "bob@example.com" ; "bare email")]
    #[test_case("not an address", None, "not an address" ; "unparseable input")]
    fn test_parse_address(input: &str, name: Option<&str>, email: &str) {
        let address = parse_address(input);

        assert_eq!(address.name.as_deref(), name);
        assert_eq!(address.email, email);
        assert_eq!(address.header_to, None);
    }

    #[test_case(r#""Bob" <bob@example.com>"# ; "named")]
    #[test_case(r#""Jane Q. Public" <jane@example.org>"# ; "name with punctuation")]
    #[test_case(r#"" Bob " <a@b.com>"# ; "padded quoted name")]
    #[test_case(r#""" <a@b.com>"# ; "empty quoted name")]
    #[test_case("bob@example.com" ; "bare")]
    fn test_parse_then_format_round_trips(input: &str) {
        let address = Address::Structured(parse_address(input));
        assert_eq!(format_address(&address), input);
    }

    #[test]
    fn test_bare_email_serializes_without_name() {
        let address = parse_address("a@b.com");
        let json = serde_json::to_value(&address).unwrap();

        assert_eq!(json, serde_json::json!({ "email": "a@b.com" }));
    }

    #[test]
    fn test_format_address_passes_strings_through() {
        let address = Address::from(r#"Anything "goes" here"#);
        assert_eq!(format_address(&address), r#"Anything "goes" here"#);
    }

    #[test]
    fn test_format_ignores_header_to() {
        let address = Address::from(
            EmailAddress::new("cc@example.com").with_header_to("to@example.com"),
        );
        assert_eq!(format_address(&address), "cc@example.com");
    }

    #[test]
    fn test_unknown_address_fields_kept() {
        let input = serde_json::json!({ "email": "a@b.com", "name": "A", "x_extra": 1 });

        let address: Address = serde_json::from_value(input.clone()).unwrap();
        let structured = address.into_structured();

        assert_eq!(structured.extra.get("x_extra"), Some(&serde_json::json!(1)));
        assert_eq!(serde_json::to_value(&structured).unwrap(), input);
    }

    #[test]
    fn test_into_structured_keeps_objects_unchanged() {
        let structured = EmailAddress::new("r@example.com")
            .with_name("Rita")
            .with_header_to("x@example.com");

        assert_eq!(
            Address::Structured(structured.clone()).into_structured(),
            structured
        );
    }

    #[test]
    fn test_from_str_and_display() {
        let address: EmailAddress = r#""Bob" <bob@example.com>"#.parse().unwrap();
        assert_eq!(address.to_string(), r#""Bob" <bob@example.com>"#);
    }

    #[test]
    fn test_untagged_deserialization() {
        let formatted: Address = serde_json::from_str(r#""bob@example.com""#).unwrap();
        assert_eq!(formatted, Address::Formatted("bob@example.com".to_string()));

        let structured: Address =
            serde_json::from_str(r#"{"email":"bob@example.com","name":"Bob"}"#).unwrap();
        assert_eq!(
            structured,
            Address::Structured(EmailAddress::new("bob@example.com").with_name("Bob"))
        );
        assert!(!structured.has_header_to());
    }
}
