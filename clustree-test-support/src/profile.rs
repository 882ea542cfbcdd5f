//! Property-test run profile read from the environment.
//!
//! `CLUSTREE_PBT_CASES` overrides the number of cases per property and
//! `CLUSTREE_PBT_FORK` toggles forked execution. Invalid overrides are logged
//! and ignored.

use std::env;

/// Environment variable controlling proptest case counts.
pub const CASES_ENV_KEY: &str = "CLUSTREE_PBT_CASES";
/// Environment variable controlling proptest process forking.
pub const FORK_ENV_KEY: &str = "CLUSTREE_PBT_FORK";

/// Case count and fork flag for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the environment, falling back to the defaults.
    ///
    /// # Examples
    /// ```
    /// use clustree_test_support::profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::from_overrides(
            env::var(CASES_ENV_KEY).ok().as_deref(),
            env::var(FORK_ENV_KEY).ok().as_deref(),
            default_cases,
            default_fork,
        )
    }

    /// Applies raw override values to the defaults.
    #[must_use]
    pub fn from_overrides(
        cases: Option<&str>,
        fork: Option<&str>,
        default_cases: u32,
        default_fork: bool,
    ) -> Self {
        Self {
            cases: apply(CASES_ENV_KEY, cases, default_cases, parse_cases),
            fork: apply(FORK_ENV_KEY, fork, default_fork, parse_flag),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether to run cases in forked subprocesses.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn apply<T: Copy>(
    key: &'static str,
    raw: Option<&str>,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    parse(raw).unwrap_or_else(|| {
        tracing::warn!(env = key, raw, "ignoring invalid property-test override");
        default
    })
}

fn parse_cases(raw: &str) -> Option<u32> {
    raw.trim().parse().ok().filter(|cases| *cases > 0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = ProptestRunProfile::from_overrides(None, None, 64, false);
        assert_eq!(profile.cases(), 64);
        assert!(!profile.fork());
    }

    #[rstest]
    #[case("1", 1)]
    #[case(" 250 ", 250)]
    #[case("0", 64)]
    #[case("-1", 64)]
    #[case("many", 64)]
    fn case_overrides(#[case] raw: &str, #[case] expected: u32) {
        let profile = ProptestRunProfile::from_overrides(Some(raw), None, 64, false);
        assert_eq!(profile.cases(), expected);
    }

    #[rstest]
    #[case("TRUE", false, true)]
    #[case("on", false, true)]
    #[case("0", true, false)]
    #[case("off", true, false)]
    #[case("maybe", true, true)]
    #[case("", false, false)]
    fn fork_overrides(#[case] raw: &str, #[case] default: bool, #[case] expected: bool) {
        let profile = ProptestRunProfile::from_overrides(None, Some(raw), 64, default);
        assert_eq!(profile.fork(), expected);
    }
}
