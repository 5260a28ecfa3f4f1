//! Word lists for phrase extraction. All entries are lower-case.

use std::collections::HashSet;

use lazy_static::lazy_static;

/// Tokens shorter than this are dropped unless allow-listed or numeric.
pub const MIN_TOKEN_CHARS: usize = 3;

const FILLER_WORDS: &[&str] = &[
    "um", "umm", "uh", "uhh", "er", "erm", "ah", "ahh", "oh", "hmm", "mm", "yeah", "yep", "yup",
    "okay", "ok", "alright", "like", "well", "so", "actually", "basically", "literally", "really",
    "just", "right", "kinda", "sorta", "maybe", "probably", "anyway", "anyways", "honestly",
    "guys", "hey", "hi", "hello", "wow", "whoa", "please", "thanks", "thank", "à", "ừ", "ờ", "ạ",
    "nhé", "nha", "thì", "mà", "đấy", "luôn",
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "of", "to", "in", "on", "at", "by", "for",
    "from", "with", "without", "into", "onto", "over", "under", "about", "as", "than", "then",
    "that", "this", "these", "those", "there", "here", "is", "am", "are", "was", "were", "be",
    "been", "being", "it", "its", "i", "me", "my", "we", "us", "our", "you", "your", "he",
    "him", "his", "she", "her", "they", "them", "their", "what", "which", "who", "whom",
    "when", "where", "why", "how", "if", "not", "no", "yes", "all", "any", "some", "very",
    "too", "also", "only", "can", "could", "will", "would", "shall", "should", "may", "might",
    "must", "do", "does", "did", "done", "have", "has", "had", "there's", "let", "lets", "up",
    "down", "out", "off", "again", "more", "most", "much", "many", "such", "own", "same",
    "each", "every", "both", "few", "other", "because", "while", "though", "although",
    "là", "của", "và", "các", "những", "một", "có", "được", "cho", "với", "này", "đó", "để",
    "khi", "trong", "từ", "như", "nhưng", "cũng", "rất", "đã", "sẽ", "đang", "thế", "nào",
];

/// Short forms that carry meaning despite their length or stop-word shape.
const ALLOW_SHORT: &[&str] = &[
    "ai", "ui", "ux", "api", "seo", "kpi", "roi", "cta", "ceo", "cfo", "b2b", "b2c", "3d", "4k",
    "5g", "vr", "ar", "ev", "gdp", "dna", "hiv", "ebv", "iot", "ml", "llm", "pr", "qa", "hr",
    "tv", "pc", "usa", "uk", "eu", "vs",
];

const VERB_DENY: &[&str] = &[
    "get", "gets", "got", "getting", "make", "makes", "made", "making", "go", "goes", "going",
    "went", "gone", "come", "comes", "came", "coming", "say", "says", "said", "saying", "know",
    "knows", "knew", "knowing", "think", "thinks", "thought", "thinking", "want", "wants",
    "wanted", "wanting", "need", "needs", "needed", "see", "sees", "saw", "seen", "look",
    "looks", "looked", "looking", "take", "takes", "took", "taken", "give", "gives", "gave",
    "given", "tell", "tells", "told", "use", "uses", "used", "using", "try", "tries", "tried",
    "trying", "keep", "keeps", "kept", "start", "starts", "started", "put", "puts", "show",
    "shows", "showed", "talk", "talks", "talked", "talking", "feel", "feels", "felt", "seem",
    "seems", "mean", "means", "meant", "happen", "happens", "happened", "become", "becomes",
    "became", "help", "helps", "helped", "work", "works", "worked", "find", "finds", "found",
    "check", "watch", "watched", "gonna", "wanna", "gotta", "làm", "nói", "biết", "muốn",
    "thấy", "đi", "đến",
];

/// Conjunctions and prepositions trimmed from phrase edges.
const CONNECTORS: &[&str] = &[
    "and", "or", "but", "with", "of", "for", "to", "in", "on", "at", "by", "from", "vs", "via",
    "versus", "plus", "và", "với", "của", "cho", "hay", "hoặc",
];

/// Transition words that split a subtitle into two supporting halves.
const SPLIT_WORDS: &[&str] = &[
    "and", "but", "because", "so", "then", "however", "while", "whereas", "or", "although",
    "và", "nhưng", "vì", "nên", "rồi", "hoặc",
];

/// Phrases made only of these carry no content on screen.
const GENERIC_TOKENS: &[&str] = &[
    "this", "that", "it", "they", "we", "you", "he", "she", "them", "our", "your", "my",
    "something", "everything", "anything", "nothing", "someone", "everyone", "thing", "things",
    "stuff", "way", "kind", "part", "lot", "lots", "bit", "today", "now", "here", "there",
    "people", "guys", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    "ten", "first", "second", "third", "next", "last", "video", "okay", "yeah", "good", "great",
    "nice", "cool", "important", "gì", "cái", "người", "điều",
];

lazy_static! {
    static ref FILLER_SET: HashSet<&'static str> = FILLER_WORDS.iter().copied().collect();
    static ref STOP_SET: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
    static ref ALLOW_SET: HashSet<&'static str> = ALLOW_SHORT.iter().copied().collect();
    static ref VERB_SET: HashSet<&'static str> = VERB_DENY.iter().copied().collect();
    static ref CONNECTOR_SET: HashSet<&'static str> = CONNECTORS.iter().copied().collect();
    static ref SPLIT_SET: HashSet<&'static str> = SPLIT_WORDS.iter().copied().collect();
    static ref GENERIC_SET: HashSet<&'static str> = GENERIC_TOKENS.iter().copied().collect();
}

pub fn is_filler(word: &str) -> bool {
    FILLER_SET.contains(word)
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

pub fn is_allowed_short(word: &str) -> bool {
    ALLOW_SET.contains(word)
}

pub fn is_denied_verb(word: &str) -> bool {
    VERB_SET.contains(word)
}

pub fn is_connector(word: &str) -> bool {
    CONNECTOR_SET.contains(word)
}

pub fn is_split_word(word: &str) -> bool {
    SPLIT_SET.contains(word)
}

pub fn is_generic(word: &str) -> bool {
    GENERIC_SET.contains(word) || is_filler(word)
}
