//! User-visible composite naming: `name ".." version` (spec.md §6). The
//! delimiter is two dots, chosen because a lone `.` inside a name must stay
//! possible (series names like `ca.example.com` exist in the wild).

/// `name ".." version`.
pub fn display_name(name: &str, version: &str) -> String {
    format!("{}..{}", name, version)
}

/// Splits on the *last* `..`, so names containing `..` themselves (rejected
/// at write time by `SecretController`, but still possible in pre-existing
/// data) do not break parsing of the trailing version.
pub fn parse_display_name(display: &str) -> Option<(String, String)> {
    let idx = display.rfind("..")?;
    let (name, rest) = display.split_at(idx);
    let version = &rest[2..];
    Some((name.to_string(), version.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_for_empty_and_nonempty_versions() {
        for (name, version) in [("DB_Pass", ""), ("API_KEY", "v1data"), ("x", "0123456789abcdef")] {
            let composite = display_name(name, version);
            assert_eq!(parse_display_name(&composite), Some((name.to_string(), version.to_string())));
        }
    }

    #[test]
    fn splits_on_the_last_double_dot() {
        let (name, version) = parse_display_name("weird..name....v1").unwrap();
        assert_eq!(name, "weird..name..");
        assert_eq!(version, "v1");
    }

    #[test]
    fn no_delimiter_fails_to_parse() {
        assert!(parse_display_name("no-delimiter-here").is_none());
    }
}
