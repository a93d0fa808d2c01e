//! Required package detection.
//!
//! Compares the package manager's listing output against the required set.
//! Substring matching mirrors how the listing has always been read: cheap and
//! tolerant of any output format, but `requests` is "found" in a listing that
//! only contains `requests-oauthlib`. Exact matching parses the listing into
//! package names first.

use std::collections::HashSet;

use crate::config::MatchMode;
use crate::toolchain::Toolchain;

/// Required packages absent from `listing`, in the order they were required.
pub fn missing_packages(listing: &str, required: &[String], mode: MatchMode) -> Vec<String> {
    match mode {
        MatchMode::Substring => required
            .iter()
            .filter(|name| !listing.contains(name.as_str()))
            .cloned()
            .collect(),
        MatchMode::Exact => {
            let installed = installed_names(listing);
            required
                .iter()
                .filter(|name| !installed.contains(&normalize_name(name)))
                .cloned()
                .collect()
        }
    }
}

/// Normalised package names found in `pip list` or `pip freeze` output.
pub fn installed_names(listing: &str) -> HashSet<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('-') && !line.starts_with('#'))
        .filter_map(|line| {
            let token = line.split_whitespace().next()?;
            let name = token.split("==").next().unwrap_or(token);
            Some(normalize_name(name))
        })
        // `pip list` table header
        .filter(|name| name != "package")
        .collect()
}

/// Lowercase and collapse `_`/`.` runs to `-` so `Python_Dotenv` matches `python-dotenv`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_dash {
                normalized.push('-');
            }
            last_dash = true;
        } else {
            normalized.extend(c.to_lowercase());
            last_dash = false;
        }
    }
    normalized
}

/// List installed packages and diff them against `required`.
pub async fn check(toolchain: &dyn Toolchain, required: &[String], mode: MatchMode) -> Vec<String> {
    let listing = toolchain.list_packages().await;
    let missing = missing_packages(&listing, required, mode);

    tracing::debug!(
        listing_bytes = listing.len(),
        required = required.len(),
        mode = ?mode,
        "Checked installed packages"
    );
    if missing.is_empty() {
        tracing::info!("All required packages are installed");
    } else {
        tracing::info!(missing = ?missing, "Required packages are missing");
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIP_LIST: &str = "\
Package            Version
------------------ ---------
Flask              3.0.2
openai             1.14.0
python-dotenv      1.0.1
requests-oauthlib  1.4.0
spotipy            2.23.0
";

    fn required() -> Vec<String> {
        ["flask", "openai", "python-dotenv", "requests", "spotipy"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_substring_reports_single_missing_name() {
        let listing = "flask 3.0\nopenai 1.0\npython-dotenv 1.0\nspotipy 2.0\n";
        assert_eq!(
            missing_packages(listing, &required(), MatchMode::Substring),
            vec!["requests"]
        );
    }

    #[test]
    fn test_substring_all_present_is_empty() {
        let listing = "flask openai python-dotenv requests spotipy";
        assert!(missing_packages(listing, &required(), MatchMode::Substring).is_empty());
    }

    #[test]
    fn test_substring_empty_listing_reports_everything() {
        assert_eq!(
            missing_packages("", &required(), MatchMode::Substring),
            required()
        );
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        // pip prints "Flask"
        let missing = missing_packages(PIP_LIST, &required(), MatchMode::Substring);
        assert_eq!(missing, vec!["flask"]);
    }

    #[test]
    fn test_substring_false_positive_on_prefix() {
        let listing = "requests-oauthlib 1.4.0";
        let required = vec!["requests".to_string()];
        assert!(missing_packages(listing, &required, MatchMode::Substring).is_empty());
    }

    #[test]
    fn test_exact_detects_prefix_only_package_as_missing() {
        let missing = missing_packages(PIP_LIST, &required(), MatchMode::Exact);
        assert_eq!(missing, vec!["requests"]);
    }

    #[test]
    fn test_exact_accepts_freeze_format() {
        let listing = "Flask==3.0.2\nopenai==1.14.0\npython_dotenv==1.0.1\nrequests==2.31.0\nspotipy==2.23.0\n";
        assert!(missing_packages(listing, &required(), MatchMode::Exact).is_empty());
    }

    #[test]
    fn test_installed_names_skips_header_and_rule() {
        let names = installed_names(PIP_LIST);
        assert_eq!(names.len(), 5);
        assert!(names.contains("flask"));
        assert!(names.contains("requests-oauthlib"));
        assert!(!names.contains("package"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Python_Dotenv"), "python-dotenv");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a__-.b"), "a-b");
    }
}
