/// Reduce a peer address to its `host:port` authority.
///
/// Accepts bare authorities ("192.168.0.5:5002") as well as http/https URLs
/// ("http://192.168.0.5:5002/"); anything without a host, or with a port
/// that is not a valid u16, is rejected.
pub fn authority(address: &str) -> Option<String> {
    let rest = address
        .strip_prefix("http://")
        .or_else(|| address.strip_prefix("https://"))
        .unwrap_or(address);
    let authority = rest.split('/').next().unwrap_or_default().trim();
    if authority.is_empty() {
        return None;
    }
    if let Some((host, port)) = authority.rsplit_once(':') {
        if host.is_empty() || port.parse::<u16>().is_err() {
            return None;
        }
    }
    Some(authority.to_string())
}

#[cfg(test)]
mod tests {
    use super::authority;

    #[test]
    fn accepts_bare_authorities_and_urls() {
        assert_eq!(
            authority("192.168.0.5:5002"),
            Some("192.168.0.5:5002".to_string())
        );
        assert_eq!(
            authority("http://192.168.0.5:5002"),
            Some("192.168.0.5:5002".to_string())
        );
        assert_eq!(
            authority("https://node.example:8080/chain"),
            Some("node.example:8080".to_string())
        );
        assert_eq!(authority("localhost"), Some("localhost".to_string()));
    }

    #[test]
    fn rejects_empty_and_malformed_addresses() {
        assert_eq!(authority(""), None);
        assert_eq!(authority("http://"), None);
        assert_eq!(authority(":8080"), None);
        assert_eq!(authority("host:notaport"), None);
        assert_eq!(authority("host:99999"), None);
    }
}
