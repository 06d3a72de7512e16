//! Key derivation: turning declared member names into hierarchical keys.
//!
//! A name is first cut at explicit separators (`_` and `-`), then each piece
//! is split wherever the character class changes (lower, upper, digit,
//! other). The last capital of an upper-case run belongs to the following
//! word, so `HTTPServer` splits into `http` and `server`. Every segment is
//! lower-cased.

/// Split a declared name into its lower-cased word segments.
///
/// `"FOOBar"` → `["foo", "bar"]`, `"max_connections"` → `["max", "connections"]`.
pub fn split_words(name: &str) -> Vec<String> {
    name.split(['_', '-'])
        .filter(|piece| !piece.is_empty())
        .flat_map(camel_split)
        .map(|word| word.to_lowercase())
        .collect()
}

/// Environment variable name for a key: segments joined by `_`, upper-cased.
pub fn env_name(key: &[String]) -> String {
    key.join("_").to_uppercase()
}

/// Flag name for a key: segments joined by `-`, lower-cased.
pub fn flag_name(key: &[String]) -> String {
    key.join("-").to_lowercase()
}

/// Map a path of member names (e.g. the segments of `server.max_connections`)
/// onto the flag-name space, so structured sources line up with field keys.
pub fn normalize_path<S: AsRef<str>>(path: &[S]) -> String {
    let key: Vec<String> = path
        .iter()
        .flat_map(|segment| split_words(segment.as_ref()))
        .collect();
    flag_name(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Other,
}

fn char_class(c: char) -> CharClass {
    if c.is_lowercase() {
        CharClass::Lower
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Other
    }
}

fn camel_split(src: &str) -> Vec<String> {
    let chars: Vec<char> = src.chars().collect();
    if chars.len() < 2 {
        return vec![src.to_string()];
    }

    let mut out = Vec::new();
    let mut last_class = char_class(chars[0]);
    let mut start = 0;

    for (i, &c) in chars.iter().enumerate() {
        let class = char_class(c);
        if class != last_class {
            if last_class == CharClass::Upper && class != CharClass::Digit {
                // keep the trailing capital for the next word: FOOBar -> FOO Bar
                if i - start > 1 {
                    out.push(chars[start..i - 1].iter().collect());
                    start = i - 1;
                }
            } else {
                out.push(chars[start..i].iter().collect());
                start = i;
            }
        }
        last_class = class;
    }
    out.push(chars[start..].iter().collect());
    out
}
