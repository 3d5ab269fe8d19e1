//! Sender allow-list

/// Addresses authorised to trigger a review when nothing else is configured
pub const DEFAULT_ALLOWED_SENDERS: &[&str] = &["devaang18@gmail.com", "neildillon10@gmail.com"];

/// Fixed set of email addresses allowed to request a review.
///
/// Addresses are compared after trimming and ASCII lowercasing. The list is
/// built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    addresses: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut addresses: Vec<String> = addresses
            .into_iter()
            .map(|a| normalize(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        addresses.sort();
        addresses.dedup();
        Self { addresses }
    }

    /// Parse a comma-separated list, e.g. the `ALLOWED_SENDERS` variable
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn contains(&self, address: &str) -> bool {
        let needle = normalize(address);
        self.addresses.binary_search(&needle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_SENDERS.iter())
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_contains_known_senders() {
        let list = AllowList::default();
        assert!(list.contains("devaang18@gmail.com"));
        assert!(list.contains("neildillon10@gmail.com"));
        assert!(!list.contains("someone@else.com"));
    }

    #[test]
    fn test_from_csv_skips_blanks_and_duplicates() {
        let list = AllowList::from_csv(" a@x.com, ,b@y.org,A@X.com,");
        assert_eq!(list.len(), 2);
        assert!(list.contains("a@x.com"));
        assert!(list.contains("b@y.org"));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["a@x.com", "b@y.org"]);
    }

    #[test]
    fn test_empty_list_rejects_everyone() {
        let list = AllowList::from_csv("");
        assert!(list.is_empty());
        assert!(!list.contains(""));
    }

    proptest! {
        #[test]
        fn listed_address_matches_any_case(
            local in "[a-z0-9]{1,12}",
            domain in "[a-z]{2,10}",
            tld in "[a-z]{2,4}",
        ) {
            let address = format!("{}@{}.{}", local, domain, tld);
            let list = AllowList::new([address.as_str()]);
            prop_assert!(list.contains(&address));
            prop_assert!(list.contains(&address.to_uppercase()));
            let padded = format!("  {}  ", address);
            prop_assert!(list.contains(&padded));
        }

        #[test]
        fn unlisted_address_never_matches(local in "[a-z]{1,12}") {
            let list = AllowList::new(["owner@example.com"]);
            let candidate = format!("{}@other.example", local);
            prop_assert!(!list.contains(&candidate));
        }
    }
}
