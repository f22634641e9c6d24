use std::fmt;

/// Release stage of a version. Pre-releases sort below the final release of
/// the same `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseStage {
    /// `rank` orders dev/snapshot (0) < alpha (1) < beta/milestone (2) < rc (3)
    PreRelease { rank: u8, number: u64 },
    Final,
}

/// Comparable `major.minor.patch` version.
///
/// Missing components default to 0, components past the third are ignored,
/// build metadata after `+` is ignored. Suffix tokens that name a
/// pre-release stage lower the version below its final release; any other
/// suffix (`Final`, `GA`, distro revisions like `-1ubuntu1`) is a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub stage: ReleaseStage,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            stage: ReleaseStage::Final,
        }
    }

    /// Parses a version string. Returns `None` for anything that does not
    /// start with a numeric component (`""`, `"latest"`, `"unknown"`).
    pub fn parse(raw: &str) -> Option<Self> {
        Self::parse_with_precision(raw).map(|(version, _)| version)
    }

    /// Like [`Version::parse`], also reporting how many numeric components
    /// were written explicitly (`"1.2"` → 2). Range operators such as `~=`
    /// and `==X.*` depend on it.
    pub fn parse_with_precision(raw: &str) -> Option<(Self, usize)> {
        let mut s = raw.trim();

        if let Some(rest) = s.strip_prefix(['v', 'V']) {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                s = rest;
            }
        }

        // Debian/RPM epoch ("2:1.18.0-1")
        if let Some((epoch, rest)) = s.split_once(':') {
            if !epoch.is_empty() && epoch.chars().all(|c| c.is_ascii_digit()) {
                s = rest;
            }
        }

        if let Some((head, _build)) = s.split_once('+') {
            s = head;
        }

        let (parts, suffix) = split_numeric_head(s)?;
        let precision = parts.len();

        let version = Version {
            major: parts[0],
            minor: parts.get(1).copied().unwrap_or(0),
            patch: parts.get(2).copied().unwrap_or(0),
            stage: classify_suffix(suffix),
        };

        Some((version, precision))
    }

    pub fn is_prerelease(&self) -> bool {
        matches!(self.stage, ReleaseStage::PreRelease { .. })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let ReleaseStage::PreRelease { rank, number } = self.stage {
            let label = match rank {
                0 => "dev",
                1 => "alpha",
                2 => "beta",
                _ => "rc",
            };
            write!(f, "-{}.{}", label, number)?;
        }
        Ok(())
    }
}

/// Splits `"1.2.3rc1"` into `([1, 2, 3], "rc1")`.
///
/// Returns `None` when the string does not begin with a digit or a numeric
/// component overflows.
pub(crate) fn split_numeric_head(s: &str) -> Option<(Vec<u64>, &str)> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut pos = 0;

    loop {
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if start == pos {
            break;
        }
        parts.push(s[start..pos].parse::<u64>().ok()?);

        let dot_then_digit = pos + 1 < bytes.len()
            && bytes[pos] == b'.'
            && bytes[pos + 1].is_ascii_digit();
        if !dot_then_digit {
            break;
        }
        pos += 1;
    }

    if parts.is_empty() {
        return None;
    }
    Some((parts, &s[pos..]))
}

fn classify_suffix(suffix: &str) -> ReleaseStage {
    let suffix = suffix
        .trim_start_matches(['-', '.', '_', '~'])
        .to_ascii_lowercase();
    if suffix.is_empty() {
        return ReleaseStage::Final;
    }

    let label_end = suffix
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(suffix.len());
    let (label, rest) = suffix.split_at(label_end);

    let rank = match label {
        "dev" | "snapshot" => 0,
        "alpha" | "a" | "ea" => 1,
        "beta" | "b" | "m" | "milestone" => 2,
        "rc" | "c" | "cr" | "pre" | "preview" => 3,
        _ => return ReleaseStage::Final,
    };

    let digits: String = rest
        .trim_start_matches(['-', '.', '_'])
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let number = digits.parse::<u64>().unwrap_or(0);

    ReleaseStage::PreRelease { rank, number }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap_or_else(|| panic!("{} should parse", raw))
    }

    #[test]
    fn test_parse_plain_versions() {
        assert_eq!(v("1.20.2"), Version::new(1, 20, 2));
        assert_eq!(v("2"), Version::new(2, 0, 0));
        assert_eq!(v("3.1"), Version::new(3, 1, 0));
        assert_eq!(v("1.2.3.4"), Version::new(1, 2, 3));
        assert_eq!(v(" v1.0.0 "), Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_precision() {
        assert_eq!(Version::parse_with_precision("1.2").unwrap().1, 2);
        assert_eq!(Version::parse_with_precision("1.2.3.4").unwrap().1, 4);
    }

    #[test]
    fn test_parse_distro_and_maven_forms() {
        assert_eq!(v("2:1.18.0-1ubuntu1"), Version::new(1, 18, 0));
        assert_eq!(v("4.1.46.Final"), Version::new(4, 1, 46));
        assert_eq!(v("1.5.0-4"), Version::new(1, 5, 0));
        assert_eq!(v("1.0.0+build.7"), Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_prerelease_suffixes() {
        assert_eq!(
            v("2.0.0rc1").stage,
            ReleaseStage::PreRelease { rank: 3, number: 1 }
        );
        assert_eq!(
            v("1.0.0-beta.2").stage,
            ReleaseStage::PreRelease { rank: 2, number: 2 }
        );
        assert_eq!(
            v("5.0.0-SNAPSHOT").stage,
            ReleaseStage::PreRelease { rank: 0, number: 0 }
        );
        assert!(v("1.26.0.dev0").is_prerelease());
        assert!(v("3.0.0a1").is_prerelease());
    }

    #[test]
    fn test_unparseable_versions() {
        assert_eq!(Version::parse(""), None);
        assert_eq!(Version::parse("latest"), None);
        assert_eq!(Version::parse("unknown"), None);
        assert_eq!(Version::parse("vNext"), None);
        assert_eq!(Version::parse("99999999999999999999999"), None);
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.2.10") > v("1.2.9"));
        assert!(v("2.0.0") > v("2.0.0rc1"));
        assert!(v("2.0.0rc1") > v("2.0.0b3"));
        assert!(v("2.0.0b3") > v("2.0.0a9"));
        assert!(v("2.0.0a1") > v("2.0.0.dev5"));
        assert!(v("2.0.0rc2") > v("2.0.0rc1"));
        assert!(v("2.0.0.dev0") > v("1.9.9"));
        assert_eq!(v("4.1.46.Final"), v("4.1.46"));
    }

    #[test]
    fn test_display() {
        assert_eq!(v("1.2").to_string(), "1.2.0");
        assert_eq!(v("1.0.0rc2").to_string(), "1.0.0-rc.2");
    }
}
