use rustc_hash::FxHashSet;

/// Hostnames of known URL-shortening services.
const KNOWN_SHORTENERS: &[&str] = &[
    "bit.ly", "goo.gl", "tinyurl.com", "ow.ly", "t.co", "is.gd", "buff.ly", "adf.ly", "j.mp",
    "bc.vc", "twitthis.com", "u.to", "tinylink.in", "soo.gd", "s2r.co", "g.co", "youtu.be",
    "lnkd.in", "linkedin.com", "cutt.ly", "short.link", "tiny.cc", "rb.gy", "clk.im", "bit.do",
    "mcaf.ee", "qr.ae", "v.gd", "tr.im", "x.co", "1url.com", "t2m.io", "zip.net", "clicky.me",
    "short.io", "tinyurl.co", "urlshortener", "linktr.ee", "sni.pt", "snipurl.com", "snurl.com",
    "shorturl.at", "chilp.it", "cl.lk", "fa.by", "go2.me", "hit.my", "linkbee.com", "liip.to",
    "moourl.com", "pic.gd", "poprl.com", "qlnk.net", "ri.ms", "rubyurl.com", "shorl.com",
    "shrinkify.com", "shrinkster.com", "smsh.me", "snipr.com", "sp2.ro", "su.pr", "togoto.us",
    "trunc.im", "twurl.nl", "url.ie", "url4.eu", "urlx.org", "yep.it", "yfrog.com", "zi.ma",
    "zurl.ws", "bitly.com",
];

/// Immutable set of shortener hostnames, normalized to lowercase without `www.`.
///
/// Matching is by substring: a hostname is a shortener when it contains any
/// registry entry, so regional and subdomain variants match their base domain.
/// This also means an unrelated host that happens to contain an entry (for
/// example one ending in `t.co`) is treated as a shortener.
#[derive(Debug, Clone)]
pub struct ShortenerRegistry {
    hosts: Vec<String>,
}

impl Default for ShortenerRegistry {
    fn default() -> Self {
        Self::from_hosts(KNOWN_SHORTENERS.iter().copied())
    }
}

impl ShortenerRegistry {
    /// Registry holding exactly `hosts`, normalized and deduplicated.
    pub fn from_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = FxHashSet::default();
        let hosts = hosts
            .into_iter()
            .map(|host| normalize_host(host.as_ref().trim()))
            // An empty entry would match every host
            .filter(|host| !host.is_empty())
            .filter(|host| seen.insert(host.clone()))
            .collect();

        Self { hosts }
    }

    /// The built-in registry plus `extra` hosts.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let builtin = KNOWN_SHORTENERS.iter().map(|host| host.to_string());
        let extra = extra.into_iter().map(|host| host.as_ref().to_string());
        Self::from_hosts(builtin.chain(extra))
    }

    /// Whether `url` points at a known shortener. Unparseable input is never one.
    pub fn is_shortened(&self, url: &str) -> bool {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };

        let host = normalize_host(host);
        self.hosts.iter().any(|entry| host.contains(entry.as_str()))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_shortened_case_insensitive() {
        let registry = ShortenerRegistry::default();
        assert!(registry.is_shortened("https://BIT.LY/abc"));
        assert!(registry.is_shortened("https://bit.ly/abc"));
    }

    #[test]
    fn test_is_shortened_rejects_regular_hosts() {
        let registry = ShortenerRegistry::default();
        assert!(!registry.is_shortened("https://example.com"));
        assert!(!registry.is_shortened("https://docs.rs/regex"));
    }

    #[test]
    fn test_is_shortened_never_fails_on_garbage() {
        let registry = ShortenerRegistry::default();
        assert!(!registry.is_shortened("not a url"));
        assert!(!registry.is_shortened(""));
        assert!(!registry.is_shortened("https://"));
        assert!(!registry.is_shortened("mailto:someone@bit.ly"));
    }

    #[test]
    fn test_is_shortened_strips_www() {
        let registry = ShortenerRegistry::default();
        assert!(registry.is_shortened("https://www.tinyurl.com/abc"));
        assert!(registry.is_shortened("http://WWW.bitly.com/x"));
    }

    #[test]
    fn test_is_shortened_substring_matches_subdomains() {
        let registry = ShortenerRegistry::default();
        assert!(registry.is_shortened("https://de.bit.ly/abc"));
        assert!(registry.is_shortened("https://my.urlshortener.example/abc"));
        // Substring semantics: an unrelated host containing an entry matches too
        assert!(registry.is_shortened("https://shopt.com/abc"));
    }

    #[test]
    fn test_from_hosts_normalizes_and_dedups() {
        let registry = ShortenerRegistry::from_hosts(["WWW.Sho.rt", "sho.rt", "  ", ""]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.hosts().collect::<Vec<_>>(), vec!["sho.rt"]);
        assert!(registry.is_shortened("https://sho.rt/abc"));
        assert!(!registry.is_shortened("https://bit.ly/abc"));
    }

    #[test]
    fn test_empty_registry_matches_nothing() {
        let registry = ShortenerRegistry::from_hosts(Vec::<String>::new());
        assert!(registry.is_empty());
        assert!(!registry.is_shortened("https://bit.ly/abc"));
    }

    #[test]
    fn test_with_extra_keeps_builtin() {
        let registry = ShortenerRegistry::with_extra(["127.0.0.1"]);
        assert!(registry.is_shortened("https://bit.ly/abc"));
        assert!(registry.is_shortened("http://127.0.0.1:8080/abc"));
        assert_eq!(registry.len(), ShortenerRegistry::default().len() + 1);
    }

    #[test]
    fn test_default_registry_has_no_duplicates() {
        let registry = ShortenerRegistry::default();
        let unique: FxHashSet<&str> = registry.hosts().collect();
        assert_eq!(unique.len(), registry.len());
    }
}
