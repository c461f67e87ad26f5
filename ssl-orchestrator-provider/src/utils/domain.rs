//! Domain name helpers shared by provider implementations and the core.
//!
//! Registrable-domain extraction uses a naive last-two-labels heuristic with
//! no public-suffix-list awareness, so multi-part suffixes such as `co.uk`
//! are mis-handled. Known limitation, kept on purpose: every supported cloud
//! API works on the same two-label zone unit.

/// Extracts the registrable (main) domain from a fully qualified name.
///
/// `www.example.com` → `example.com`, `sub.test.example.com` → `example.com`.
/// Names with fewer than two labels are returned unchanged.
#[must_use]
pub fn main_domain(domain: &str) -> &str {
    match domain.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &domain[idx + 1..],
        None => domain,
    }
}

/// Extracts the sub-label part of a record name relative to `main` (the RR
/// value DNS APIs expect).
///
/// `_dnsauth.www.example.com` relative to `example.com` → `_dnsauth.www`.
/// Names that do not end in `.main` pass through unchanged, so labels that
/// are already relative (Tencent hands those out) stay as they are.
#[must_use]
pub fn sub_domain<'a>(full: &'a str, main: &str) -> &'a str {
    full.strip_suffix(main)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .unwrap_or(full)
}

/// Whether `name` equals `main` or sits below it.
#[must_use]
pub fn is_subdomain(name: &str, main: &str) -> bool {
    name == main || name.strip_suffix(main).is_some_and(|p| p.ends_with('.'))
}

/// Whether a certificate name covers a target host name.
///
/// Exact match, or a single-label wildcard: `*.example.com` covers
/// `api.example.com` but not `api.sub.example.com`.
#[must_use]
pub fn matches_domain(cert_name: &str, target: &str) -> bool {
    if cert_name == target {
        return true;
    }

    if let Some(suffix) = cert_name.strip_prefix("*.") {
        if let Some(prefix) = target.strip_suffix(suffix) {
            return prefix.ends_with('.') && !prefix[..prefix.len() - 1].contains('.');
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_domain_strips_subdomains() {
        assert_eq!(main_domain("a.b.example.com"), "example.com");
        assert_eq!(main_domain("www.example.com"), "example.com");
    }

    #[test]
    fn main_domain_keeps_two_labels() {
        assert_eq!(main_domain("example.com"), "example.com");
    }

    #[test]
    fn main_domain_keeps_single_label() {
        assert_eq!(main_domain("localhost"), "localhost");
    }

    #[test]
    fn sub_domain_strips_main() {
        assert_eq!(
            sub_domain("_dnsauth.www.example.com", "example.com"),
            "_dnsauth.www"
        );
    }

    #[test]
    fn sub_domain_unrelated_passthrough() {
        assert_eq!(sub_domain("other.com", "example.com"), "other.com");
    }

    #[test]
    fn sub_domain_equal_passthrough() {
        // The apex itself carries no sub-label to strip.
        assert_eq!(sub_domain("example.com", "example.com"), "example.com");
    }

    #[test]
    fn sub_domain_relative_passthrough() {
        assert_eq!(sub_domain("_dnsauth", "example.com"), "_dnsauth");
    }

    #[test]
    fn sub_domain_no_partial_label_match() {
        assert_eq!(sub_domain("aexample.com", "example.com"), "aexample.com");
    }

    #[test]
    fn is_subdomain_cases() {
        assert!(is_subdomain("example.com", "example.com"));
        assert!(is_subdomain("www.example.com", "example.com"));
        assert!(!is_subdomain("other.com", "example.com"));
        assert!(!is_subdomain("aexample.com", "example.com"));
    }

    #[test]
    fn matches_exact() {
        assert!(matches_domain("www.example.com", "www.example.com"));
        assert!(!matches_domain("www.example.com", "api.example.com"));
    }

    #[test]
    fn matches_wildcard_single_label() {
        assert!(matches_domain("*.example.com", "api.example.com"));
        assert!(!matches_domain("*.example.com", "api.sub.example.com"));
    }

    #[test]
    fn wildcard_does_not_match_apex() {
        assert!(!matches_domain("*.example.com", "example.com"));
    }

    #[test]
    fn wildcard_deep_suffix() {
        assert!(matches_domain("*.sub.example.com", "www.sub.example.com"));
        assert!(!matches_domain("*.sub.example.com", "a.b.sub.example.com"));
    }
}
