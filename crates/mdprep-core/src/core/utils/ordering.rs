use std::cmp::Ordering;

/// One run of a job name, tagged for natural comparison.
///
/// Variant order is significant: digit runs rank below text runs, so the
/// derived `Ord` compares the tag before the value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeySegment {
    Number(Digits),
    Text(String),
}

/// A run of ASCII digits compared by integer value, without overflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits(String);

impl Digits {
    fn new(run: &str) -> Self {
        let significant = run.trim_start_matches('0');
        Self(significant.to_string())
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key that orders names the way a person would ("job9" < "job10").
pub type NaturalKey = Vec<KeySegment>;

/// Splits `name` into alternating text and digit runs.
///
/// The split always starts with a text run and ends with one, either of
/// which may be empty, so "10" yields `["", 10, ""]`. Only ASCII digits form
/// number runs. Digits from other scripts, such as "٣", stay part of the
/// surrounding text run.
pub fn natural_key(name: &str) -> NaturalKey {
    let mut key = Vec::new();
    let mut rest = name;

    loop {
        let text_end = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        key.push(KeySegment::Text(rest[..text_end].to_lowercase()));
        rest = &rest[text_end..];

        if rest.is_empty() {
            break;
        }

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        key.push(KeySegment::Number(Digits::new(&rest[..digits_end])));
        rest = &rest[digits_end..];
    }

    key
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// Sorts names in place into natural order.
pub fn sort_naturally<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by_cached_key(|name| natural_key(name.as_ref()));
}
