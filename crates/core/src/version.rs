use crate::error::PyenvError;

/// Versions shorter than this are rejected as malformed. No deeper
/// semantic version parsing is performed.
pub const MIN_VERSION_LENGTH: usize = 4;

/// Validate a Python version before it is used for any I/O.
pub fn validate_version(version: &str) -> Result<&str, PyenvError> {
    if version.chars().count() < MIN_VERSION_LENGTH {
        return Err(PyenvError::InvalidVersion {
            version: version.to_owned(),
        });
    }

    Ok(version)
}

/// Split a comma separated list, trimming whitespace and dropping empty items.
pub fn split_commas(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_owned())
        .collect()
}

/// Remove duplicates, keeping the first occurrence of each value.
pub fn unique(values: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(values.len());

    for value in values {
        if !result.contains(value) {
            result.push(value.clone());
        }
    }

    result
}

/// Derive the set of Python versions to install: the unique explicit
/// versions, plus the default version when it is longer than 4 characters
/// and not already listed, sorted lexicographically (so "3.9.0" sorts after "3.10.0").
pub fn derive_working_versions(explicit_versions: &[String], default_version: &str) -> Vec<String> {
    let mut versions = unique(explicit_versions);

    if includes_default_version(default_version) && !versions.iter().any(|v| v == default_version) {
        versions.push(default_version.to_owned());
    }

    versions.sort();
    versions
}

/// Whether the default version takes part in installation. This is a
/// stricter boundary (`> 4`) than [`validate_version`] (`>= 4`).
pub fn includes_default_version(default_version: &str) -> bool {
    default_version.chars().count() > MIN_VERSION_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn validates_length() {
        assert!(validate_version("3.11.4").is_ok());
        assert!(validate_version("3.10").is_ok());
        assert!(matches!(
            validate_version("3.9"),
            Err(PyenvError::InvalidVersion { .. })
        ));
        assert!(matches!(
            validate_version(""),
            Err(PyenvError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn splits_commas() {
        assert_eq!(
            split_commas(" 3.9.1, 3.10.0,,3.11.2 ,"),
            strings(&["3.9.1", "3.10.0", "3.11.2"])
        );
        assert!(split_commas("").is_empty());
    }

    #[test]
    fn uniques_in_order() {
        assert_eq!(
            unique(&strings(&["b", "a", "b", "c", "a"])),
            strings(&["b", "a", "c"])
        );
    }

    #[test]
    fn derives_lexicographic_working_set() {
        let versions = derive_working_versions(&strings(&["3.9.1", "3.9.1", "3.10.0"]), "3.11.2");

        assert_eq!(versions, strings(&["3.10.0", "3.11.2", "3.9.1"]));
    }

    #[test]
    fn skips_short_default_version() {
        assert_eq!(
            derive_working_versions(&strings(&["3.9.1"]), "3.10"),
            strings(&["3.9.1"])
        );
        assert_eq!(derive_working_versions(&[], ""), Vec::<String>::new());
    }

    #[test]
    fn doesnt_duplicate_default_version() {
        assert_eq!(
            derive_working_versions(&strings(&["3.11.2"]), "3.11.2"),
            strings(&["3.11.2"])
        );
    }
}
