//! Extraction of upstream commit tokens from published version strings.
//!
//! Compare links need a ref the upstream repository understands. Each
//! dependency embeds the source commit in its version differently, so each
//! gets its own extraction rule.

/// Rule for reading a short commit hash out of a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionTokenExtractor {
    /// `git describe` style image tags: `2023.06.0-41.g57d229e[.dirty]`.
    ///
    /// Drops any `.dirty` suffix, takes the last `.` segment and strips its
    /// leading `g`.
    GitDescribe,

    /// Chart versions ending in a build hash: `1.0.0-0.dev.git.3128.h7a6b4d7`.
    ///
    /// Takes the last seven characters of the last `.` segment.
    ChartBuildHash,
}

/// Length of an abbreviated commit hash in chart versions.
const SHORT_HASH_LEN: usize = 7;

impl VersionTokenExtractor {
    /// Returns the commit token for `version`.
    ///
    /// Inputs that do not follow the convention are returned as best-effort
    /// slices rather than rejected; the result only feeds a link.
    #[must_use]
    pub fn extract<'a>(self, version: &'a str) -> &'a str {
        match self {
            Self::GitDescribe => {
                let clean = version.split(".dirty").next().unwrap_or(version);
                let segment = last_segment(clean);
                let mut chars = segment.chars();
                chars.next();
                chars.as_str()
            }
            Self::ChartBuildHash => {
                let segment = last_segment(version);
                let count = segment.chars().count();
                match segment.char_indices().nth(count.saturating_sub(SHORT_HASH_LEN)) {
                    Some((start, _)) => &segment[start..],
                    None => segment,
                }
            }
        }
    }
}

fn last_segment(version: &str) -> &str {
    version.rsplit('.').next().unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_describe_vectors() {
        let cases = [
            ("2023.06.0-41.g57d229e", "57d229e"),
            ("0.11.0-181.g2ab3b2d.dirty", "2ab3b2d"),
            ("2022.10.0-232.g0ea6f7d", "0ea6f7d"),
            ("abc1234", "bc1234"),
            ("", ""),
        ];
        for (version, token) in cases {
            assert_eq!(
                VersionTokenExtractor::GitDescribe.extract(version),
                token,
                "{version}"
            );
        }
    }

    #[test]
    fn chart_build_hash_vectors() {
        let cases = [
            ("1.0.0-0.dev.git.3128.h7a6b4d7", "7a6b4d7"),
            ("0.2.0-n653.h2b3c4d5", "2b3c4d5"),
            ("0.2.0-3b53fce", "3b53fce"),
            ("0.2.1", "1"),
            ("abc", "abc"),
        ];
        for (version, token) in cases {
            assert_eq!(
                VersionTokenExtractor::ChartBuildHash.extract(version),
                token,
                "{version}"
            );
        }
    }
}
