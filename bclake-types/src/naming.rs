/// Derives a human-readable name from a camel-case entity-set identifier.
///
/// Every uppercase ASCII letter is preceded by a space, the first character is
/// uppercased and the result trimmed: `salesOrderLines` becomes
/// `Sales Order Lines`. Falls back to the identifier when the result is empty.
pub fn display_name_from_identifier(identifier: &str) -> String {
    let mut spaced = String::with_capacity(identifier.len() + 8);
    for ch in identifier.chars() {
        if ch.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }

    let mut chars = spaced.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    let trimmed = capitalized.trim();
    if trimmed.is_empty() {
        identifier.to_string()
    } else {
        trimmed.to_string()
    }
}
