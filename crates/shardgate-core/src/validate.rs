//! Input validation for endpoint registration.
//!
//! Runs before any I/O; a rejected input has no side effects anywhere.

/// Minimum endpoint name length.
pub const MIN_NAME_LEN: usize = 3;

/// Maximum endpoint name length.
pub const MAX_NAME_LEN: usize = 32;

/// Whether a name is a valid endpoint identity: 3–32 characters, ASCII
/// alphanumeric plus `-` and `_`.
pub fn valid_name(name: &str) -> bool {
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Whether a port is connectable (1–65535; zero is not a real listener).
pub fn valid_port(port: u16) -> bool {
    port != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        assert!(valid_name("alpha"));
        assert!(valid_name("sky-block_2"));
        assert!(valid_name("abc"));
        assert!(valid_name(&"a".repeat(32)));
    }

    #[test]
    fn rejects_length_violations() {
        assert!(!valid_name(""));
        assert!(!valid_name("ab"));
        assert!(!valid_name(&"a".repeat(33)));
    }

    #[test]
    fn rejects_bad_characters() {
        assert!(!valid_name("has space"));
        assert!(!valid_name("dots.net"));
        assert!(!valid_name("emoji✨"));
        assert!(!valid_name("slash/name"));
    }

    #[test]
    fn port_zero_is_invalid() {
        assert!(!valid_port(0));
        assert!(valid_port(1));
        assert!(valid_port(25565));
        assert!(valid_port(65535));
    }
}
