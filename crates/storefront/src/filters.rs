//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    #[test]
    fn test_current_year_matches_clock() {
        let year = chrono::Utc::now().year();
        assert!(year >= 2024);
    }
}
