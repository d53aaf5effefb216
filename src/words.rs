use rand::seq::IndexedRandom;

/// A (civilian_word, undercover_word) pairing for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub civilian: String,
    pub undercover: String,
}

impl WordPair {
    pub fn new(civilian: impl Into<String>, undercover: impl Into<String>) -> Self {
        Self {
            civilian: civilian.into(),
            undercover: undercover.into(),
        }
    }
}

/// Supplies the word pair for each new game.
///
/// The engine only depends on this contract; the built-in bank below is the
/// default implementation and tests swap in a fixed one.
pub trait WordSource: Send + Sync {
    fn pick(&self) -> WordPair;
}

/// Related-but-different word pairings. The civilian word comes first.
const WORD_PAIRS: &[(&str, &str)] = &[
    ("coffee", "tea"),
    ("dog", "cat"),
    ("guitar", "piano"),
    ("ocean", "lake"),
    ("sun", "moon"),
    ("book", "magazine"),
    ("car", "motorcycle"),
    ("apple", "orange"),
    ("winter", "autumn"),
    ("basketball", "volleyball"),
    ("rice", "noodles"),
    ("chair", "sofa"),
    ("phone", "tablet"),
    ("train", "subway"),
    ("hotel", "motel"),
    ("doctor", "nurse"),
    ("teacher", "professor"),
    ("river", "stream"),
    ("mountain", "hill"),
    ("bread", "toast"),
    ("soup", "stew"),
    ("cake", "pie"),
    ("shirt", "blouse"),
    ("pants", "jeans"),
    ("sneakers", "sandals"),
    ("watch", "clock"),
    ("fork", "spoon"),
    ("knife", "sword"),
    ("pen", "pencil"),
    ("laptop", "desktop"),
    ("keyboard", "piano"),
    ("mouse", "rat"),
    ("butterfly", "moth"),
    ("spider", "ant"),
    ("rose", "tulip"),
    ("tree", "bush"),
    ("grass", "weed"),
    ("rain", "snow"),
    ("thunder", "lightning"),
    ("fire", "flame"),
    ("ice", "frost"),
    ("juice", "soda"),
    ("beer", "wine"),
    ("burger", "sandwich"),
    ("pizza", "pasta"),
    ("chicken", "turkey"),
    ("beef", "pork"),
    ("fish", "shrimp"),
    ("carrot", "potato"),
    ("tomato", "pepper"),
];

/// Built-in word bank drawing uniformly from the pairs above.
pub struct BuiltinWordBank;

impl WordSource for BuiltinWordBank {
    fn pick(&self) -> WordPair {
        // The slice is a non-empty constant, so choose always succeeds.
        let (civilian, undercover) = WORD_PAIRS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(WORD_PAIRS[0]);
        WordPair::new(civilian, undercover)
    }
}
