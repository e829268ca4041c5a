use super::{MarkerFamily, SEPARATOR};

/// Indices of every opening marker of `family` in `text`.
///
/// Only the opening sequence (`[[oc3::`) has to be present.
pub fn indices(family: MarkerFamily, text: &str) -> impl Iterator<Item = u32> + '_ {
    let prefix = family.prefix();
    text.match_indices(prefix).filter_map(move |(start, _)| {
        let after_prefix = &text[start + prefix.len()..];
        let digits = after_prefix
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 || !after_prefix[digits..].starts_with(SEPARATOR) {
            return None;
        }
        after_prefix[..digits].parse().ok()
    })
}

/// Highest index used across all `values`, 0 when there is none
pub fn highest_index<'a, I>(family: MarkerFamily, values: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .flat_map(|value| indices(family, value))
        .max()
        .unwrap_or(0)
}

/// Index for the next cloze given the highest one in use.
///
/// `reuse` keeps the highest index (the modifier key is held), otherwise
/// it moves on by one. Indices start at 1.
pub fn next_index(highest: u32, reuse: bool) -> u32 {
    let index = if reuse {
        highest
    } else {
        highest.saturating_add(1)
    };
    index.max(1)
}
