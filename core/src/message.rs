//! Transaction message rendering

use serde::Serialize;
use tracing::error;

/// Render `prefix` followed by the JSON form of `attributes`
///
/// The two parts are always joined by exactly one space. If the attributes
/// cannot be serialized the failure is logged and the JSON part is empty.
pub fn format_message<T>(prefix: &str, attributes: &T) -> String
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(attributes).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize transaction attributes");
        String::new()
    });

    let mut message = String::with_capacity(prefix.len() + 1 + payload.len());
    message.push_str(prefix);
    message.push(' ');
    message.push_str(&payload);
    message
}
