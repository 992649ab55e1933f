//! Deterministic stemmers.
//!
//! Indonesian uses a dictionary-gated affix stripper: inflectional particles
//! and possessives, one derivational suffix, then up to three derivational
//! prefixes with nasal recoding. A removal only counts when the remainder is
//! a known root word; otherwise the token is returned unchanged. Every output
//! is either a root or the input itself, so stemming a stem is a no-op.
//!
//! English delegates to the Snowball stemmer, iterated to a fixpoint.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use rust_stemmers::Algorithm;

use super::Language;
use crate::core::{Error, Result};

static INDONESIAN_ROOTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("roots/indonesian.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
});

const PARTICLES: [&str; 4] = ["lah", "kah", "tah", "pun"];
const POSSESSIVES: [&str; 3] = ["nya", "ku", "mu"];
const MAX_PREFIXES: usize = 3;
const MAX_SNOWBALL_PASSES: usize = 8;

/// How a prefix rewrites the start of the remaining word.
#[derive(Clone, Copy)]
enum Recode {
    None,
    /// Nasal prefix: a vowel-initial remainder may have lost this consonant.
    Restore(char),
    /// `meny-`/`peny-` always replace an initial `s`.
    Always(char),
}

const PREFIXES: [(&str, Recode); 19] = [
    ("meny", Recode::Always('s')),
    ("meng", Recode::Restore('k')),
    ("mem", Recode::Restore('p')),
    ("men", Recode::Restore('t')),
    ("me", Recode::None),
    ("peny", Recode::Always('s')),
    ("peng", Recode::Restore('k')),
    ("pem", Recode::Restore('p')),
    ("pen", Recode::Restore('t')),
    ("per", Recode::None),
    ("pel", Recode::None),
    ("pe", Recode::None),
    ("ber", Recode::None),
    ("bel", Recode::None),
    ("be", Recode::None),
    ("ter", Recode::None),
    ("di", Recode::None),
    ("ke", Recode::None),
    ("se", Recode::None),
];

/// Token stemmer for one language.
pub enum Stemmer {
    Indonesian(IndonesianStemmer),
    Snowball(rust_stemmers::Stemmer),
    /// Stemming disabled.
    Identity,
}

impl Stemmer {
    pub fn for_language(language: Language, enabled: bool) -> Self {
        if !enabled {
            return Self::Identity;
        }
        match language {
            Language::Indonesian => Self::Indonesian(IndonesianStemmer),
            Language::English => Self::Snowball(rust_stemmers::Stemmer::create(Algorithm::English)),
        }
    }

    /// Stem one lowercase token.
    pub fn stem(&self, token: &str) -> Result<String> {
        match self {
            Self::Indonesian(stemmer) => stemmer.stem(token),
            Self::Snowball(stemmer) => {
                let mut current = token.to_string();
                for _ in 0..MAX_SNOWBALL_PASSES {
                    let next = stemmer.stem(&current).into_owned();
                    if next == current {
                        break;
                    }
                    current = next;
                }
                Ok(current)
            }
            Self::Identity => Ok(token.to_string()),
        }
    }
}

impl fmt::Debug for Stemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indonesian(_) => f.write_str("Stemmer::Indonesian"),
            Self::Snowball(_) => f.write_str("Stemmer::Snowball"),
            Self::Identity => f.write_str("Stemmer::Identity"),
        }
    }
}

/// Dictionary-gated Indonesian affix stripper.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndonesianStemmer;

impl IndonesianStemmer {
    /// Stem a token made of ASCII lowercase letters.
    ///
    /// Any other character is rejected with [`Error::Stem`]. Tokens with no
    /// root reachable by affix removal come back unchanged.
    pub fn stem(&self, token: &str) -> Result<String> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(Error::Stem {
                token: token.to_string(),
            });
        }
        Ok(find_root(token).unwrap_or_else(|| token.to_string()))
    }

    /// Whether `word` is in the bundled root list.
    pub fn is_root(word: &str) -> bool {
        INDONESIAN_ROOTS.contains(word)
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn strip_any<'a>(word: &'a str, suffixes: &[&str]) -> &'a str {
    suffixes
        .iter()
        .find_map(|suffix| word.strip_suffix(suffix).filter(|rest| !rest.is_empty()))
        .unwrap_or(word)
}

fn find_root(word: &str) -> Option<String> {
    if IndonesianStemmer::is_root(word) {
        return Some(word.to_string());
    }

    let without_particle = strip_any(word, &PARTICLES);
    let without_possessive = strip_any(without_particle, &POSSESSIVES);

    let mut bases = vec![without_possessive];
    for base in [without_particle, word] {
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    bases.into_iter().find_map(|base| {
        suffix_candidates(base).into_iter().find_map(|candidate| {
            if IndonesianStemmer::is_root(candidate) {
                Some(candidate.to_string())
            } else {
                strip_prefixes(candidate, 0)
            }
        })
    })
}

/// The word with each applicable derivational suffix removed, then the word
/// itself. Circumfixes `ke-...-an` and `pe-...-an` try `-an` before `-kan`.
fn suffix_candidates(word: &str) -> Vec<&str> {
    let order: [&str; 3] = if word.starts_with("ke") || word.starts_with("pe") {
        ["an", "kan", "i"]
    } else {
        ["kan", "an", "i"]
    };

    let mut candidates: Vec<&str> = order
        .iter()
        .filter_map(|suffix| word.strip_suffix(suffix))
        .filter(|rest| !rest.is_empty())
        .collect();
    candidates.push(word);
    candidates
}

/// Every remainder left by removing one prefix, recoded variants included.
fn prefix_options(word: &str) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        if candidate.chars().count() > 1 && !options.contains(&candidate) {
            options.push(candidate);
        }
    };

    for (prefix, recode) in PREFIXES {
        let Some(rest) = word.strip_prefix(prefix) else {
            continue;
        };
        match recode {
            Recode::None => push(rest.to_string()),
            Recode::Always(c) => push(format!("{c}{rest}")),
            Recode::Restore(c) => {
                push(rest.to_string());
                if rest.starts_with(is_vowel) {
                    push(format!("{c}{rest}"));
                }
            }
        }
    }
    options
}

fn strip_prefixes(word: &str, depth: usize) -> Option<String> {
    if depth == MAX_PREFIXES {
        return None;
    }
    let options = prefix_options(word);
    if let Some(root) = options.iter().find(|o| IndonesianStemmer::is_root(o)) {
        return Some(root.clone());
    }
    options
        .iter()
        .find_map(|option| strip_prefixes(option, depth + 1))
}
