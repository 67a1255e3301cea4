use unicode_normalization::UnicodeNormalization;

/// Differences tolerated by [`matches`] before a candidate is rejected.
pub const MAX_DIFFERENCES: usize = 2;

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Lowercases, strips diacritics and collapses whitespace runs to one space.
pub fn normalize(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let stripped: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Approximate match of a query term against a candidate field.
///
/// An empty or absent query matches anything. Otherwise the normalized candidate
/// must contain the normalized query, or the two must differ in at most
/// [`MAX_DIFFERENCES`] positions when compared character by character from the
/// start. This is a positional count, not an edit distance: one inserted
/// character shifts every later position.
pub fn matches(query: Option<&str>, candidate: &str) -> bool {
    let query = match query {
        Some(q) if !q.is_empty() => q,
        _ => return true,
    };

    let query = normalize(Some(query));
    let candidate = normalize(Some(candidate));

    if candidate.contains(&query) {
        return true;
    }

    let query: Vec<char> = query.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    let max_len = query.len().max(candidate.len());

    let mut differences = 0;
    for i in 0..max_len {
        if differences > MAX_DIFFERENCES {
            break;
        }
        if query.get(i) != candidate.get(i) {
            differences += 1;
        }
    }

    differences <= MAX_DIFFERENCES
}
