//! Pattern (وزن) substitution.

/// Placeholder for the first radical (ف).
pub const FAA: char = '\u{0641}';
/// Placeholder for the second radical (ع).
pub const AIN: char = '\u{0639}';
/// Placeholder for the third radical (ل).
pub const LAM: char = '\u{0644}';

/// Inject a three-letter root into a scheme template. Placeholders ف/ع/ل
/// become radicals 1/2/3; every other template character is copied as is.
/// Returns an empty string when the root is not exactly three letters.
pub fn apply_pattern(root: &str, template: &str) -> String {
    let radicals: Vec<char> = root.chars().collect();
    let [r1, r2, r3] = match radicals.as_slice() {
        [a, b, c] => [*a, *b, *c],
        _ => return String::new(),
    };

    template
        .chars()
        .map(|ch| match ch {
            FAA => r1,
            AIN => r2,
            LAM => r3,
            other => other,
        })
        .collect()
}

/// Character offsets of the first ف, ع and ل in a template.
pub fn radical_positions(template: &str) -> [Option<usize>; 3] {
    let mut positions = [None; 3];
    for (idx, ch) in template.chars().enumerate() {
        let slot = match ch {
            FAA => 0,
            AIN => 1,
            LAM => 2,
            _ => continue,
        };
        if positions[slot].is_none() {
            positions[slot] = Some(idx);
        }
    }
    positions
}
