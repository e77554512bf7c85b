use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Sort by cumulative time spent in a function and everything it called.
pub const CUMULATIVE: &str = "cumulative";

/// Sort by the number of calls.
pub const CALLS: &str = "calls";

/// Sort by the standard name of the function (`file:line(name)`).
pub const STDNAME: &str = "stdname";

/// Sort by the internal time of a function, excluding time spent in measured callees.
pub const TIME: &str = "time";

/// The field by which the rows of a profiling statistics table are ordered.
///
/// Each variant has a string tag (see [`as_str()`][Self::as_str]) that can be parsed back
/// via [`FromStr`], which is how sort keys arrive from attribute arguments or user input.
///
/// # Examples
///
/// ```
/// use profmem::SortKey;
///
/// let key: SortKey = "calls".parse().unwrap();
/// assert_eq!(key, SortKey::Calls);
///
/// assert!("fastest".parse::<SortKey>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the set of sort keys mirrors the columns of the statistics table"
)]
pub enum SortKey {
    /// Descending cumulative time.
    #[default]
    Cumulative,

    /// Descending call count.
    Calls,

    /// Ascending standard name.
    StdName,

    /// Descending internal time.
    Time,
}

impl SortKey {
    /// The string tag of this sort key, e.g. `"cumulative"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cumulative => CUMULATIVE,
            Self::Calls => CALLS,
            Self::StdName => STDNAME,
            Self::Time => TIME,
        }
    }

    /// How the ordering is described in the header of a statistics table.
    pub(crate) const fn description(self) -> &'static str {
        match self {
            Self::Cumulative => "cumulative time",
            Self::Calls => "call count",
            Self::StdName => "standard name",
            Self::Time => "internal time",
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CUMULATIVE => Ok(Self::Cumulative),
            CALLS => Ok(Self::Calls),
            STDNAME => Ok(Self::StdName),
            TIME => Ok(Self::Time),
            _ => Err(Error::InvalidSortKey {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<&str> for SortKey {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const ALL: [SortKey; 4] = [
        SortKey::Cumulative,
        SortKey::Calls,
        SortKey::StdName,
        SortKey::Time,
    ];

    #[test]
    fn default_is_cumulative() {
        assert_eq!(SortKey::default(), SortKey::Cumulative);
    }

    #[test]
    fn tags_parse_back_to_the_same_key() {
        for key in ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
            assert_eq!(SortKey::try_from(key.to_string().as_str()).unwrap(), key);
        }
    }

    #[test]
    fn constants_match_tags() {
        assert_eq!(SortKey::Cumulative.as_str(), CUMULATIVE);
        assert_eq!(SortKey::Calls.as_str(), CALLS);
        assert_eq!(SortKey::StdName.as_str(), STDNAME);
        assert_eq!(SortKey::Time.as_str(), TIME);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let error = "Cumulative".parse::<SortKey>().unwrap_err();

        assert!(matches!(error, Error::InvalidSortKey { value } if value == "Cumulative"));
    }

    #[test]
    fn empty_tag_is_rejected() {
        assert!("".parse::<SortKey>().is_err());
    }

    #[test]
    fn descriptions_are_distinct() {
        let mut descriptions: Vec<_> = ALL.iter().map(|key| key.description()).collect();
        descriptions.sort_unstable();
        descriptions.dedup();

        assert_eq!(descriptions.len(), ALL.len());
    }
}
