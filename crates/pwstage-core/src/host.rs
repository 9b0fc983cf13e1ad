//! Host name checks shared by configuration and providers.

/// Reason `value` is unusable as an ssh host or jump host, if any.
///
/// Hosts end up as bare ssh arguments, so empty values, whitespace and a
/// leading `-` (which ssh would parse as an option) are rejected.
#[must_use]
pub fn host_rejection(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("must not be empty")
    } else if value.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if value.starts_with('-') {
        Some("must not start with '-'")
    } else {
        None
    }
}
