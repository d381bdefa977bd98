//! Phone number and header helpers

use std::collections::HashMap;

/// Custom header carrying the prepared call id on outbound calls
pub const CALLER_ID_HEADER: &str = "X-PH-callerId";
/// Custom header carrying the call direction on outbound calls
pub const DIRECTION_HEADER: &str = "X-PH-direction";
/// Header names that may carry the inbound call id, in priority order
pub const CALL_UUID_HEADERS: [&str; 2] = ["callUUID", "call_uuid"];
/// Address suffix the SDK appends to inbound caller numbers
pub const DEFAULT_ADDRESS_SUFFIX: &str = "@phone.plivo.com";

/// Prefix `phone_number` with `+` unless it already starts with one.
///
/// Anything else, whitespace included, is passed through unchanged.
///
/// ```rust
/// use webphone_client_core::phone::normalize_phone_number;
///
/// assert_eq!(normalize_phone_number("13322309337"), "+13322309337");
/// assert_eq!(normalize_phone_number("+15551234"), "+15551234");
/// ```
pub fn normalize_phone_number(phone_number: &str) -> String {
    if phone_number.starts_with('+') {
        phone_number.to_string()
    } else {
        format!("+{}", phone_number)
    }
}

/// Caller number from an SDK address such as `123@phone.plivo.com`
pub fn strip_address_suffix(address: &str, suffix: &str) -> String {
    match address.strip_suffix(suffix) {
        Some(number) if !suffix.is_empty() => number.to_string(),
        _ => address.to_string(),
    }
}

/// First non-empty call id found in the inbound custom headers
pub fn extract_call_uuid(headers: &HashMap<String, String>) -> Option<String> {
    CALL_UUID_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Custom headers attached to an outbound call placement
pub fn outbound_headers(call_id: &str) -> HashMap<String, String> {
    HashMap::from([
        (CALLER_ID_HEADER.to_string(), call_id.to_string()),
        (DIRECTION_HEADER.to_string(), "outbound".to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_adds_plus_once() {
        assert_eq!(normalize_phone_number("555123"), "+555123");
        assert_eq!(normalize_phone_number("+1555000"), "+1555000");
        assert_eq!(normalize_phone_number("555-123 "), "+555-123 ");
        assert_eq!(normalize_phone_number(""), "+");
    }

    #[test]
    fn test_strip_address_suffix() {
        assert_eq!(strip_address_suffix("123@phone.plivo.com", DEFAULT_ADDRESS_SUFFIX), "123");
        assert_eq!(strip_address_suffix("sip:bob@example.com", DEFAULT_ADDRESS_SUFFIX), "sip:bob@example.com");
        assert_eq!(strip_address_suffix("123", ""), "123");
    }

    #[test]
    fn test_call_uuid_header_priority() {
        let both = HashMap::from([
            ("callUUID".to_string(), "primary".to_string()),
            ("call_uuid".to_string(), "secondary".to_string()),
        ]);
        assert_eq!(extract_call_uuid(&both).as_deref(), Some("primary"));

        let snake = HashMap::from([("call_uuid".to_string(), "u1".to_string())]);
        assert_eq!(extract_call_uuid(&snake).as_deref(), Some("u1"));

        let empty_first = HashMap::from([
            ("callUUID".to_string(), String::new()),
            ("call_uuid".to_string(), "u2".to_string()),
        ]);
        assert_eq!(extract_call_uuid(&empty_first).as_deref(), Some("u2"));

        assert_eq!(extract_call_uuid(&HashMap::new()), None);
    }

    #[test]
    fn test_outbound_headers() {
        let headers = outbound_headers("abc");
        assert_eq!(headers.get(CALLER_ID_HEADER).map(String::as_str), Some("abc"));
        assert_eq!(headers.get(DIRECTION_HEADER).map(String::as_str), Some("outbound"));
        assert_eq!(headers.len(), 2);
    }
}
