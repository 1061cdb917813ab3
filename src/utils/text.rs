//! Case-insensitive string comparison.
//!
//! Package identities and project file names are matched the way MSBuild and
//! NuGet match them: ordinal comparison after upper-casing each character.

use std::cmp::Ordering;

/// Compare two strings ignoring case, character by character.
///
/// # Examples
///
/// ```
/// # use std::cmp::Ordering;
/// # use flexref::utils::cmp_ignore_case;
/// assert_eq!(cmp_ignore_case("acme.core", "Acme.Data"), Ordering::Less);
/// ```
#[must_use]
pub fn cmp_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_uppercase)
        .cmp(right.chars().flat_map(char::to_uppercase))
}

/// Check two strings for equality ignoring case.
#[must_use]
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    if left.is_ascii() && right.is_ascii() {
        return left.eq_ignore_ascii_case(right);
    }
    cmp_ignore_case(left, right) == Ordering::Equal
}
