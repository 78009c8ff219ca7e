//! Site configuration shared by the decision functions and the redirect resolver.

use url::{Origin, Url};

const DEFAULT_LOCAL_HOST_ID: i64 = 1;

#[derive(Clone, Debug)]
pub struct SiteConfig {
    root: Url,
    local_host_id: i64,
}

impl SiteConfig {
    #[must_use]
    pub fn new(root: Url) -> Self {
        Self {
            root,
            local_host_id: DEFAULT_LOCAL_HOST_ID,
        }
    }

    /// Parse the site root (`wwwroot`) from configuration.
    ///
    /// # Errors
    /// Returns an error if the value is not an absolute URL.
    pub fn parse(root: &str) -> Result<Self, url::ParseError> {
        Url::parse(root).map(Self::new)
    }

    #[must_use]
    pub fn with_local_host_id(mut self, host_id: i64) -> Self {
        self.local_host_id = host_id;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Realm id of accounts managed by this host's own credential store.
    #[must_use]
    pub fn local_host_id(&self) -> i64 {
        self.local_host_id
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        self.root.origin()
    }

    /// Resolve `candidate` against the site root and keep it only when it stays on
    /// the site's origin.
    ///
    /// Relative paths always resolve onto the site. Protocol-relative references,
    /// other hosts, other ports and non-hierarchical schemes (`javascript:`,
    /// `data:`) do not.
    #[must_use]
    pub fn same_origin(&self, candidate: &str) -> Option<Url> {
        let target = self.root.join(candidate.trim()).ok()?;
        (target.origin() == self.origin()).then_some(target)
    }

    /// Cookies are only marked `Secure` when the site itself is served over HTTPS.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.root.scheme() == "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig::parse("https://school.example/").expect("valid site url")
    }

    #[test]
    fn defaults_to_host_one() {
        assert_eq!(site().local_host_id(), 1);
        assert_eq!(site().with_local_host_id(7).local_host_id(), 7);
    }

    #[test]
    fn parse_rejects_relative_root() {
        assert!(SiteConfig::parse("/moodle").is_err());
    }

    #[test]
    fn same_origin_accepts_relative_paths() {
        let target = site().same_origin("/course/view.php?id=5");
        assert_eq!(
            target.map(String::from),
            Some("https://school.example/course/view.php?id=5".to_string())
        );
    }

    #[test]
    fn same_origin_accepts_absolute_on_site() {
        assert!(site().same_origin("https://school.example/my/").is_some());
    }

    #[test]
    fn same_origin_rejects_foreign_targets() {
        let site = site();
        assert!(site.same_origin("https://attacker.example/phish").is_none());
        assert!(site.same_origin("//attacker.example/phish").is_none());
        assert!(site.same_origin("http://school.example/").is_none());
        assert!(site.same_origin("https://school.example:8443/").is_none());
        assert!(site.same_origin("javascript:alert(1)").is_none());
    }

    #[test]
    fn cookie_secure_follows_scheme() {
        assert!(site().cookie_secure());
        let plain = SiteConfig::parse("http://localhost:8080").expect("valid site url");
        assert!(!plain.cookie_secure());
    }
}
