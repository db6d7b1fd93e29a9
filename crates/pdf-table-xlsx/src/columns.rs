use std::collections::{HashMap, HashSet};

pub const UNNAMED_COLUMN: &str = "Unnamed";

/// Fills blank header candidates and suffixes repeats with `_1`, `_2`, ...
///
/// Output has the same length and order as the input, with no empty and no
/// duplicate names. A generated suffix that collides with a name already in
/// use is skipped in favor of the next free counter.
#[must_use]
pub fn normalize_headers<S: AsRef<str>>(candidates: &[Option<S>]) -> Vec<String> {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut out = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let name = match candidate.as_ref().map(|value| value.as_ref()) {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => UNNAMED_COLUMN.to_string(),
        };

        if used.insert(name.clone()) {
            counters.entry(name.clone()).or_insert(0);
            out.push(name);
            continue;
        }

        let counter = counters.entry(name.clone()).or_insert(0);
        let renamed = loop {
            *counter += 1;
            let renamed = format!("{name}_{counter}");
            if used.insert(renamed.clone()) {
                break renamed;
            }
        };
        out.push(renamed);
    }

    out
}

/// Convenience for header rows where every cell is present.
#[must_use]
pub fn normalize_header_strings<S: AsRef<str>>(candidates: &[S]) -> Vec<String> {
    let wrapped = candidates.iter().map(Some).collect::<Vec<_>>();
    normalize_headers(&wrapped)
}
