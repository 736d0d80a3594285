//! Utility functions and helpers

use regex::Regex;

/// Regex for validating logical resource names
/// Names must start with a letter, followed by letters or numbers
pub static LOGICAL_ID_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap());

/// Application load balancer names: up to 32 alphanumerics or hyphens, no leading
/// or trailing hyphen
pub static LOAD_BALANCER_NAME_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,30}[A-Za-z0-9])?$").unwrap()
    });

/// A single DNS label
static DNS_LABEL_REGEX: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^(?:\*|[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)$").unwrap()
});

/// Check that `name` is a fully qualified DNS name with at least two labels.
///
/// A single trailing dot is accepted. A wildcard is only allowed as the first label.
pub fn is_valid_domain_name(name: &str) -> bool {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() || trimmed.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = trimmed.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().enumerate().all(|(index, label)| {
        DNS_LABEL_REGEX.is_match(label) && (*label != "*" || index == 0)
    })
}

/// Check that `name` is acceptable as an application load balancer name
pub fn is_valid_load_balancer_name(name: &str) -> bool {
    LOAD_BALANCER_NAME_REGEX.is_match(name) && !name.starts_with("internal-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_names() {
        assert!(is_valid_domain_name("example.com"));
        assert!(is_valid_domain_name("www.example.com."));
        assert!(is_valid_domain_name("*.example.com"));
        assert!(!is_valid_domain_name(".test-domain."));
        assert!(!is_valid_domain_name("localhost"));
        assert!(!is_valid_domain_name("www.*.example.com"));
        assert!(!is_valid_domain_name("-bad.example.com"));
        assert!(!is_valid_domain_name(""));
    }

    #[test]
    fn test_load_balancer_names() {
        assert!(is_valid_load_balancer_name("frontend-alb"));
        assert!(is_valid_load_balancer_name("a"));
        assert!(!is_valid_load_balancer_name("-frontend"));
        assert!(!is_valid_load_balancer_name("frontend-"));
        assert!(!is_valid_load_balancer_name("internal-frontend"));
        assert!(!is_valid_load_balancer_name(&"a".repeat(33)));
    }

    #[test]
    fn test_logical_ids() {
        assert!(LOGICAL_ID_REGEX.is_match("FrontendWebAcl"));
        assert!(!LOGICAL_ID_REGEX.is_match("Frontend-WebAcl"));
        assert!(!LOGICAL_ID_REGEX.is_match("1Frontend"));
    }
}
