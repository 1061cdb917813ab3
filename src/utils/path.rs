//! Path helpers for project references.

use std::path::Path;

/// The final component of `path` as a string (lossy), or an empty string.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The file name referenced by an MSBuild `Include` or solution `Path` value.
///
/// Both `\` and `/` are treated as separators regardless of platform, since
/// project files are usually authored on Windows.
///
/// # Examples
///
/// ```
/// # use flexref::utils::include_file_name;
/// assert_eq!(include_file_name(r"..\Acme.Core\Acme.Core.csproj"), "Acme.Core.csproj");
/// ```
#[must_use]
pub fn include_file_name(include: &str) -> &str {
    include
        .trim()
        .rsplit(['\\', '/'])
        .find(|segment| !segment.is_empty())
        .unwrap_or_default()
}

/// Relative path from the directory containing `from_file` to `to_file`,
/// using `\` as separator.
///
/// Falls back to `to_file` itself when no relative path exists (for example
/// across Windows drive letters).
#[must_use]
pub fn relative_path_with_backslashes(from_file: &Path, to_file: &Path) -> String {
    let from_directory = from_file.parent().unwrap_or(from_file);
    let relative =
        pathdiff::diff_paths(to_file, from_directory).unwrap_or_else(|| to_file.to_path_buf());

    relative.to_string_lossy().replace('/', "\\")
}
