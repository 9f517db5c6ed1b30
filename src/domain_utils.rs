use url::Url;

/// Extract the bare authority from a URL for candidate comparison and
/// reporting.
///
/// Lower-cases the host, keeps an explicit non-default port, and strips a
/// single leading `www.`. Returns `None` when the input is not an absolute
/// URL or has no host component (mailto:, data:, relative paths). No
/// public-suffix reduction happens here: `example.co.uk` stays
/// `example.co.uk`, and a subdomain like `shop.example.com` is reported
/// as-is. Consistency matters more than registrable-domain correctness for
/// the comparisons we do.
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        return None;
    }
    match parsed.port() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host_basic() {
        assert_eq!(extract_host("https://acme.com/"), Some("acme.com".to_string()));
        assert_eq!(extract_host("http://acme.com"), Some("acme.com".to_string()));
    }

    #[test]
    fn test_extract_host_strips_www_and_lowercases() {
        assert_eq!(
            extract_host("https://www.Acme.com/page?x=1"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            extract_host("HTTPS://WWW.EXAMPLE.ORG/About"),
            Some("example.org".to_string())
        );
    }

    #[test]
    fn test_extract_host_keeps_non_www_subdomains() {
        assert_eq!(
            extract_host("https://shop.acme.com/catalog"),
            Some("shop.acme.com".to_string())
        );
        // Only a leading "www." is stripped, deeper labels are untouched
        assert_eq!(
            extract_host("https://www.shop.acme.com/"),
            Some("shop.acme.com".to_string())
        );
    }

    /// Multi-label suffixes pass through untouched. There is deliberately no
    /// public-suffix handling, so consumers must treat the result as a host
    /// string, not a registrable domain.
    #[test]
    fn test_extract_host_no_public_suffix_reduction() {
        assert_eq!(
            extract_host("https://example.co.uk/"),
            Some("example.co.uk".to_string())
        );
        assert_eq!(
            extract_host("https://www.example.co.uk/"),
            Some("example.co.uk".to_string())
        );
    }

    #[test]
    fn test_extract_host_keeps_explicit_port() {
        assert_eq!(
            extract_host("http://acme.com:8080/page?q=1#frag"),
            Some("acme.com:8080".to_string())
        );
        assert_eq!(
            extract_host("http://127.0.0.1:4545/"),
            Some("127.0.0.1:4545".to_string())
        );
    }

    #[test]
    fn test_extract_host_drops_scheme_default_port() {
        // The parser normalizes default ports away before we see them
        assert_eq!(
            extract_host("https://acme.com:443/"),
            Some("acme.com".to_string())
        );
        assert_eq!(
            extract_host("http://acme.com:80/"),
            Some("acme.com".to_string())
        );
    }

    #[test]
    fn test_extract_host_unparseable() {
        assert_eq!(extract_host("not a url"), None);
        assert_eq!(extract_host(""), None);
        assert_eq!(extract_host("acme.com"), None); // relative, no scheme
        assert_eq!(extract_host("://missing-scheme.com"), None);
    }

    #[test]
    fn test_extract_host_no_authority() {
        assert_eq!(extract_host("mailto:info@acme.com"), None);
        assert_eq!(extract_host("data:text/plain,hello"), None);
    }
}
