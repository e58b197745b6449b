//! Patch reconstruction from arbitrary subsets of diff units.

use std::collections::HashMap;

use crate::git::diff::DiffUnit;

/// Rebuilds a standalone patch document from a set of [`DiffUnit`]s.
///
/// Units are grouped by file path; file blocks are ordered by the files'
/// parse-time ordinals, and within each file units are re-sorted by their
/// recorded sequence index. The AI grouping may return unit ids in any
/// order, and hunks applied out of positional order corrupt the patch, so
/// both sorts are load-bearing: the same unit set rebuilds byte-identical
/// output regardless of input order.
///
/// Each file's shared header is emitted once, followed by its hunks. The
/// output ends with a trailing newline and is applicable via
/// `git apply --cached` to a tree matching the original diff's "before"
/// side. Empty input yields an empty string, not an error.
pub fn build_patch(units: &[&DiffUnit]) -> String {
    if units.is_empty() {
        return String::new();
    }

    let mut files: Vec<(usize, &str)> = Vec::new();
    let mut by_file: HashMap<&str, Vec<&DiffUnit>> = HashMap::new();
    for unit in units {
        let entry = by_file.entry(unit.path.as_str()).or_default();
        if entry.is_empty() {
            files.push((unit.file_order, unit.path.as_str()));
        }
        entry.push(unit);
    }
    files.sort_by_key(|(order, _)| *order);

    let mut out = String::new();
    for (_, path) in files {
        let Some(mut file_units) = by_file.remove(path) else {
            continue;
        };
        file_units.sort_by_key(|u| u.index);

        for line in &file_units[0].file_header {
            out.push_str(line);
            out.push('\n');
        }
        for unit in file_units {
            for line in &unit.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    out
}
