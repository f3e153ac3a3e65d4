//! Latin <-> Cyrillic spelling variants.
//!
//! Both directions come from a single pair table, so every Cyrillic letter has exactly one Latin
//! spelling. Latin input is scanned longest-match first so that digraphs like `sch`, `zh` and `ya`
//! become one Cyrillic letter; Cyrillic input is mapped a character at a time.

use std::{collections::HashMap, sync::LazyLock};

///`(latin, cyrillic)` - where two Cyrillic letters share a Latin spelling, the last one listed wins
///when going from Latin to Cyrillic
const PAIRS: &[(&str, char)] = &[
    ("a", 'а'),
    ("b", 'б'),
    ("v", 'в'),
    ("g", 'г'),
    ("d", 'д'),
    ("e", 'е'),
    ("yo", 'ё'),
    ("zh", 'ж'),
    ("z", 'з'),
    ("i", 'и'),
    ("j", 'й'),
    ("k", 'к'),
    ("l", 'л'),
    ("m", 'м'),
    ("n", 'н'),
    ("o", 'о'),
    ("p", 'п'),
    ("r", 'р'),
    ("s", 'с'),
    ("t", 'т'),
    ("u", 'у'),
    ("f", 'ф'),
    ("h", 'х'),
    ("ts", 'ц'),
    ("ch", 'ч'),
    ("sh", 'ш'),
    ("sch", 'щ'),
    ("y", 'ы'),
    ("e", 'э'),
    ("yu", 'ю'),
    ("ya", 'я'),
];

const LONGEST_LATIN: usize = 3;

struct Table {
    to_cyrillic: HashMap<&'static str, char>,
    to_latin: HashMap<char, &'static str>,
}

fn table() -> &'static Table {
    static TABLE: LazyLock<Table> = LazyLock::new(|| {
        let mut to_cyrillic = HashMap::new();
        let mut to_latin = HashMap::new();

        for &(latin, cyrillic) in PAIRS {
            to_cyrillic.insert(latin, cyrillic);
            to_latin.insert(cyrillic, latin);
        }

        Table {
            to_cyrillic,
            to_latin,
        }
    });
    &TABLE
}

///Swaps the script of every letter the table knows about, leaving everything else untouched.
pub fn transliterate(normalised: &str) -> String {
    let table = table();
    let chars: Vec<char> = normalised.chars().collect();
    let mut output = String::with_capacity(normalised.len() * 2);

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if let Some(latin) = table.to_latin.get(&c) {
            output.push_str(latin);
            i += 1;
            continue;
        }

        let mut matched = false;
        if c.is_ascii_alphabetic() {
            for len in (1..=LONGEST_LATIN.min(chars.len() - i)).rev() {
                let candidate: String = chars[i..i + len].iter().collect();
                if let Some(cyrillic) = table.to_cyrillic.get(candidate.as_str()) {
                    output.push(*cyrillic);
                    i += len;
                    matched = true;
                    break;
                }
            }
        }

        if !matched {
            output.push(c);
            i += 1;
        }
    }

    output
}

///The lower-cased, trimmed term, followed by its other-script spelling if that is any different.
///
///Terms with digits in are codes rather than words, so they only ever get the one variant.
pub fn variants(term: &str) -> Vec<String> {
    let normalised = term.trim().to_lowercase();
    if normalised.chars().any(char::is_numeric) {
        return vec![normalised];
    }

    let transliterated = transliterate(&normalised);
    if transliterated == normalised {
        vec![normalised]
    } else {
        vec![normalised, transliterated]
    }
}
