pub fn convert<F: SplitWords, T: JoinWords>(source: &str) -> String {
    T::concatenate(&F::split(source))
}

/// A naming convention names can be read in.
pub trait SplitWords {
    fn split(name: &str) -> Vec<&str>;
}

/// A naming convention names can be written in.
pub trait JoinWords {
    fn concatenate(words: &[&str]) -> String;
}

/// `ListView`; every uppercase letter after the first one starts a new word.
pub struct PascalCase;

impl SplitWords for PascalCase {
    fn split(name: &str) -> Vec<&str> {
        let mut words = Vec::new();
        let mut start = 0;
        for (i, c) in name.char_indices().skip(1) {
            if c.is_uppercase() {
                words.push(&name[start..i]);
                start = i;
            }
        }
        if start < name.len() {
            words.push(&name[start..]);
        }
        words
    }
}

/// `list-view`
pub struct KebabCase;

impl JoinWords for KebabCase {
    fn concatenate(words: &[&str]) -> String {
        words
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
