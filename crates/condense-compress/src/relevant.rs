//! Query-directed extraction with merged context windows

/// Inclusive line range `[start, end]`
type Window = (usize, usize);

fn match_windows(lines: &[&str], query: &str, context: usize) -> Vec<Window> {
    let needle = query.to_lowercase();
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .map(|(i, _)| (i.saturating_sub(context), (i + context).min(last)))
        .collect()
}

/// Greedy interval merge. Touching windows merge so no zero-line gap is emitted.
fn merge_windows(mut windows: Vec<Window>) -> Vec<Window> {
    windows.sort_by_key(|w| w.0);
    let mut merged: Vec<Window> = Vec::with_capacity(windows.len());
    for (start, end) in windows {
        match merged.last_mut() {
            Some(prev) if start <= prev.1 + 1 => prev.1 = prev.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Lines containing `query` (case-insensitive) plus `context` lines either side.
///
/// Blocks are separated by an elision marker. Returns `None` when nothing matches.
pub fn extract_relevant(text: &str, query: &str, context: usize) -> Option<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let windows = merge_windows(match_windows(&lines, query, context));
    if windows.is_empty() {
        return None;
    }

    let mut out: Vec<String> = Vec::new();
    let mut prev_end: Option<usize> = None;
    for (start, end) in windows {
        if let Some(prev) = prev_end {
            out.push(format!("... ({} lines skipped) ...", start - prev - 1));
        }
        out.extend(lines[start..=end].iter().map(|l| l.to_string()));
        prev_end = Some(end);
    }
    Some(out.join("\n"))
}
