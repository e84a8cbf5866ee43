/// Byte offsets of the `?` placeholders in a raw SQL fragment. A `?` inside
/// a quoted string literal or quoted identifier is not a placeholder.
pub(super) fn placeholders(fragment: &str) -> Vec<usize> {
    let mut offsets = vec![];
    let mut quote = None;

    for (offset, c) in fragment.char_indices() {
        match quote {
            // A doubled quote closes and immediately reopens.
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '?' => offsets.push(offset),
            None => {}
        }
    }

    offsets
}
