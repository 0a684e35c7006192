//! Free-text sectioning helpers

/// Split a block of text on blank-line boundaries into trimmed, non-empty
/// sections, preserving order. Used to post-process free-text command
/// output into per-section items.
pub fn split_on_empty_lines(value: &str) -> Vec<String> {
    value
        .split("\n\n")
        .filter_map(|section| {
            let trimmed = section.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
