//! Shared builders for unified-diff test fixtures.

/// Builds a standard single-file diff header.
pub(crate) fn make_file_header(path: &str) -> String {
    format!(
        "diff --git a/{path} b/{path}\n\
         index abc1234..def5678 100644\n\
         --- a/{path}\n\
         +++ b/{path}\n"
    )
}

/// Builds a single hunk string.
pub(crate) fn make_hunk(
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
    body: &str,
) -> String {
    format!("@@ -{old_start},{old_count} +{new_start},{new_count} @@\n{body}")
}

/// Builds a complete single-file, single-hunk diff.
pub(crate) fn make_single_file_diff(path: &str, hunk_body: &str) -> String {
    format!(
        "{}{}",
        make_file_header(path),
        make_hunk(1, 3, 1, 4, hunk_body)
    )
}
