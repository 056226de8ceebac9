//! Tracker hostname normalization.
//!
//! Every subsystem that compares tracker sets — the decision engine's
//! identity checks, the conflict resolver's priority lookups, and the data
//! layer's JSON column codec — must agree on one normal form, or "same
//! tracker set" silently stops being true across module boundaries.

/// Normalize a collection of tracker hostnames: trim, lowercase, drop
/// empties, deduplicate, and sort for deterministic serialization.
///
/// Applying this twice is a no-op (`normalize_trackers(normalize_trackers(x))
/// == normalize_trackers(x)`), which is what lets callers normalize eagerly
/// at every boundary without worrying about double-normalizing.
#[must_use]
pub fn normalize_trackers<I, S>(trackers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = trackers
        .into_iter()
        .map(|t| t.as_ref().trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    normalized.sort_unstable();
    normalized.dedup();
    normalized
}

/// Compare two tracker sets for equality after normalization.
#[must_use]
pub fn trackers_equal<I, J, S, T>(left: I, right: J) -> bool
where
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    normalize_trackers(left) == normalize_trackers(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let result = normalize_trackers([" Tracker.Example ", "tracker.example", "OTHER.example"]);
        assert_eq!(result, vec!["other.example", "tracker.example"]);
    }

    #[test]
    fn idempotent_under_renormalization() {
        let once = normalize_trackers(["B", "a", "a"]);
        let twice = normalize_trackers(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn drops_empty_entries() {
        let result = normalize_trackers(["", "  ", "tracker.example"]);
        assert_eq!(result, vec!["tracker.example"]);
    }

    #[test]
    fn equality_ignores_order_and_case() {
        assert!(trackers_equal(
            ["Tracker.A", "tracker.b"],
            ["tracker.b", "TRACKER.A"]
        ));
        assert!(!trackers_equal(["tracker.a"], ["tracker.b"]));
    }
}
