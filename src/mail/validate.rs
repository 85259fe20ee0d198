//! Recipient address validation
//!
//! Accepts `local@domain` where the local part is either dot-separated
//! atoms or a quoted string, and the domain is either an IPv4 literal in
//! brackets or dotted labels ending in an alphabetic top-level label.

const ATOM_SPECIALS: &[char] = &['<', '>', '(', ')', '[', ']', '\\', '.', ',', ';', ':', '@', '"'];

/// Check an address against the accepted grammar
pub fn validate_address(raw: &str) -> bool {
    let Some(at) = raw.rfind('@') else {
        return false;
    };
    let (local, domain) = (&raw[..at], &raw[at + 1..]);
    valid_local_part(local) && valid_domain(domain)
}

fn valid_local_part(local: &str) -> bool {
    if local.len() >= 3 && local.starts_with('"') && local.ends_with('"') {
        return true;
    }
    !local.is_empty() && local.split('.').all(valid_atom)
}

fn valid_atom(atom: &str) -> bool {
    !atom.is_empty()
        && atom
            .chars()
            .all(|c| !c.is_whitespace() && !ATOM_SPECIALS.contains(&c))
}

fn valid_domain(domain: &str) -> bool {
    if let Some(literal) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        return valid_ipv4_literal(literal);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }

    let label_ok = |label: &&str| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    rest.iter().all(label_ok) && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn valid_ipv4_literal(literal: &str) -> bool {
    let octets: Vec<&str> = literal.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| (1..=3).contains(&o.len()) && o.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        assert!(validate_address("person@example.com"));
        assert!(validate_address("a.b+c@sub.example.co"));
        assert!(validate_address("x@y.com"));
        assert!(validate_address("first_last-99@mail-host.example.org"));
    }

    #[test]
    fn test_domain_is_case_insensitive() {
        assert!(validate_address("person@EXAMPLE.COM"));
        assert!(validate_address("Person@Example.Com"));
    }

    #[test]
    fn test_accepts_quoted_local_and_ip_literal() {
        assert!(validate_address("\"john doe\"@example.com"));
        assert!(validate_address("\"odd@local\"@example.com"));
        assert!(validate_address("user@[192.168.0.1]"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!validate_address("not-an-email"));
        assert!(!validate_address("@example.com"));
        assert!(!validate_address("person@"));
        assert!(!validate_address("person@.com"));
        assert!(!validate_address("x@y"));
        assert!(!validate_address(""));
    }

    #[test]
    fn test_rejects_bad_local_parts() {
        assert!(!validate_address("a..b@example.com"));
        assert!(!validate_address(".ab@example.com"));
        assert!(!validate_address("ab.@example.com"));
        assert!(!validate_address("a b@example.com"));
        assert!(!validate_address(" person@example.com"));
        assert!(!validate_address("a,b@example.com"));
        assert!(!validate_address("\"\"@example.com"));
    }

    #[test]
    fn test_rejects_bad_domains() {
        assert!(!validate_address("person@example.c"));
        assert!(!validate_address("person@example.c0m"));
        assert!(!validate_address("person@exa_mple.com"));
        assert!(!validate_address("person@example..com"));
        assert!(!validate_address("person@example.com "));
        assert!(!validate_address("user@[192.168.0]"));
        assert!(!validate_address("user@[1921.168.0.1]"));
    }
}
