use std::collections::HashSet;
use std::path::PathBuf;

/// Merged scan result plus whether the cap cut anything off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated {
    pub files: Vec<PathBuf>,
    pub truncated: bool,
}

/// Merge per-root results in root order, keep first occurrences, cap at `max_files`
///
/// This is the only place the cap and dedup rules are enforced; backends may
/// truncate locally but the result here is authoritative. Applying it to its own
/// output returns the same list.
pub fn aggregate<I>(per_root: I, max_files: usize) -> Aggregated
where
    I: IntoIterator<Item = Vec<PathBuf>>,
{
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    for paths in per_root {
        for path in paths {
            if seen.contains(&path) {
                continue;
            }
            if files.len() >= max_files {
                return Aggregated {
                    files,
                    truncated: true,
                };
            }
            seen.insert(path.clone());
            files.push(path);
        }
    }

    Aggregated {
        files,
        truncated: false,
    }
}
