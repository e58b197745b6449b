//! Unified diff parsing into independently addressable per-hunk units.

/// Marker that begins a per-file section in unified diff output.
const FILE_DIFF_MARKER: &str = "diff --git a/";

/// Marker that begins a hunk within a file diff.
const HUNK_MARKER: &str = "@@ ";

/// Maximum number of changed lines included in a unit summary.
const SUMMARY_MAX_LINES: usize = 5;

/// Maximum characters kept per summary line.
const SUMMARY_LINE_LEN: usize = 48;

/// One hunk of a unified diff, addressable independently of the other
/// hunks in the same file.
///
/// Units are created once per [`parse_units`] call and are immutable
/// afterwards. The `(path, index)` pair identifies a unit; [`id`](Self::id)
/// renders it as `"path:index"`.
#[derive(Debug, Clone)]
pub struct DiffUnit {
    /// Path of the file this hunk belongs to (extracted from the `b/` side
    /// of `diff --git a/... b/...`).
    pub path: String,
    /// 1-based ordinal among units of the same file, assigned at parse
    /// time. Used to re-sort units into file-internal positional order
    /// after arbitrary regrouping.
    pub index: usize,
    /// 0-based ordinal of this unit's file within the parsed diff, shared
    /// by every unit of the same file. Used to keep file blocks in their
    /// original diff order during reconstruction.
    pub file_order: usize,
    /// The `@@` range header line.
    pub header: String,
    /// Literal lines of the hunk, header first. Never empty.
    pub lines: Vec<String>,
    /// File-level header lines (`diff --git`, `index`, mode markers,
    /// `---`, `+++`), shared by every unit of the same file.
    pub file_header: Vec<String>,
    /// Bounded extract of the added/removed lines, for progress display
    /// and the AI catalog. Never used for patch reconstruction.
    pub summary: String,
}

impl DiffUnit {
    /// Returns the unit identifier, `"path:index"`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.path, self.index)
    }
}

/// Parses a flat unified diff into an ordered sequence of [`DiffUnit`]s.
///
/// File entries with no `@@` hunk header (binary files, mode-only changes,
/// pure renames) produce no units; see [`unsplittable_paths`] for
/// detecting them. Empty or marker-free input returns an empty `Vec`.
pub fn parse_units(raw_diff: &str) -> Vec<DiffUnit> {
    let mut units = Vec::new();
    let mut path = String::new();
    let mut file_header: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut index = 0usize;
    let mut file_order = 0usize;

    for line in raw_diff.lines() {
        if line.starts_with(FILE_DIFF_MARKER) {
            flush_unit(&mut units, &path, &file_header, &mut current, index, file_order);
            if !file_header.is_empty() {
                file_order += 1;
            }
            path = extract_path_from_diff_header(line);
            file_header = vec![line.to_string()];
            index = 0;
        } else if line.starts_with(HUNK_MARKER) && !file_header.is_empty() {
            flush_unit(&mut units, &path, &file_header, &mut current, index, file_order);
            index += 1;
            current.push(line.to_string());
        } else if !current.is_empty() {
            // Inside a hunk: content lines are kept verbatim, including
            // their leading +/-/space markers.
            current.push(line.to_string());
        } else if !file_header.is_empty() {
            // Between the file marker and the first hunk: file metadata
            // (index, mode, ---, +++) accumulates into the shared header.
            file_header.push(line.to_string());
        }
        // Lines before the first file marker are not part of any entry.
    }
    flush_unit(&mut units, &path, &file_header, &mut current, index, file_order);

    units
}

/// Returns the paths of file entries that contain no hunks.
///
/// Such entries (binary files, mode-only changes, pure renames) cannot be
/// split or reconstructed and are excluded from the commit plan; callers
/// should surface them so the user can commit those files separately.
pub fn unsplittable_paths(raw_diff: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current_path: Option<String> = None;
    let mut has_hunk = false;

    for line in raw_diff.lines() {
        if line.starts_with(FILE_DIFF_MARKER) {
            if let Some(path) = current_path.take() {
                if !has_hunk {
                    paths.push(path);
                }
            }
            current_path = Some(extract_path_from_diff_header(line));
            has_hunk = false;
        } else if line.starts_with(HUNK_MARKER) {
            has_hunk = true;
        }
    }
    if let Some(path) = current_path {
        if !has_hunk {
            paths.push(path);
        }
    }

    paths
}

/// Emits the in-progress unit, if any, and clears the accumulator.
fn flush_unit(
    units: &mut Vec<DiffUnit>,
    path: &str,
    file_header: &[String],
    current: &mut Vec<String>,
    index: usize,
    file_order: usize,
) {
    if current.is_empty() {
        return;
    }
    let lines = std::mem::take(current);
    units.push(DiffUnit {
        path: path.to_string(),
        index,
        file_order,
        header: lines[0].clone(),
        summary: summarize(&lines),
        file_header: file_header.to_vec(),
        lines,
    });
}

/// Builds the bounded summary for one unit: added/removed lines only,
/// each truncated, at most a handful of them.
fn summarize(lines: &[String]) -> String {
    lines
        .iter()
        .skip(1) // the @@ header line
        .filter(|l| l.starts_with('+') || l.starts_with('-'))
        .take(SUMMARY_MAX_LINES)
        .map(|l| l.chars().take(SUMMARY_LINE_LEN).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts the file path from the `b/` side of a `diff --git` header line.
fn extract_path_from_diff_header(header_line: &str) -> String {
    // Format: "diff --git a/old_path b/new_path"
    // Find the last " b/" to handle paths that may contain spaces.
    if let Some(b_pos) = header_line.rfind(" b/") {
        header_line[b_pos + 3..].to_string()
    } else {
        // Fallback: try to extract from after "diff --git a/".
        header_line
            .strip_prefix(FILE_DIFF_MARKER)
            .unwrap_or(header_line)
            .to_string()
    }
}
