//! Coherence gate: a cheap heuristic pre-filter that rejects input too short,
//! too repetitive, or too structurally implausible to be worth classifying.
//!
//! The gate is a pure, total function over the text. The rule tables below are
//! fixed; nothing here learns or adapts. Rules are evaluated in order and the
//! first one that fires decides the verdict.

use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// Literal nonsensical three-word combinations, compared against the whole
/// lowercased, trimmed input.
pub const INCOHERENT_PHRASES: &[&str] = &[
    "casa azul mojado",
    "perro volando matemáticas",
    "mesa correr feliz",
    "computadora cantar verde",
    "silla bailar número",
    "árbol escribir calor",
    "teléfono dormir azúcar",
    "libro nadar rojo",
    "ventana comer fríos",
    "zapato volar música",
    "reloj bailar agua",
    "puerta correr números",
];

/// Physical objects that cannot perform any of [`IMPOSSIBLE_ACTIONS`].
pub const PHYSICAL_OBJECTS: &[&str] = &[
    "casa",
    "mesa",
    "silla",
    "puerta",
    "ventana",
    "libro",
    "teléfono",
    "computadora",
];

/// Actions no entry of [`PHYSICAL_OBJECTS`] can perform.
pub const IMPOSSIBLE_ACTIONS: &[&str] = &[
    "cantar", "bailar", "correr", "volar", "nadar", "dormir", "comer",
];

/// High-frequency Spanish function words and verbs that mark grammatical
/// structure. Coherent input contains at least one of them.
pub const STRUCTURE_WORDS: &[&str] = &[
    // articles
    "el", "la", "los", "las", "un", "una", "unos", "unas",
    // common verbs
    "es", "está", "son", "están", "tiene", "tienen", "hay", "fue", "era",
    // prepositions
    "de", "del", "en", "con", "por", "para", "desde", "hasta", "sobre",
    // pronouns and determiners
    "que", "se", "me", "te", "le", "nos", "les", "mi", "tu", "su",
    // adverbs and connectors
    "muy", "más", "menos", "bien", "mal", "no", "sí", "y", "o", "pero",
    // first-person verbs
    "quiero", "necesito", "creo", "pienso", "siento", "veo", "escucho",
    "necesitamos", "queremos", "podemos", "debemos",
];

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// The rule that rejected a text, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncoherenceReason {
    /// Nothing left after trimming.
    Empty,
    /// Fewer than two whitespace-separated tokens.
    TooFewTokens,
    /// Fewer than three word characters once punctuation is stripped.
    TooFewCharacters,
    /// Fewer than two distinct alphabetic tokens.
    Repetitive,
    /// Exactly one of [`INCOHERENT_PHRASES`].
    KnownIncoherentPhrase,
    /// A physical object followed by an action it cannot perform.
    ImplausibleAction,
    /// No function word from [`STRUCTURE_WORDS`].
    NoGrammaticalStructure,
}

impl std::fmt::Display for IncoherenceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncoherenceReason::Empty => "empty",
            IncoherenceReason::TooFewTokens => "too_few_tokens",
            IncoherenceReason::TooFewCharacters => "too_few_characters",
            IncoherenceReason::Repetitive => "repetitive",
            IncoherenceReason::KnownIncoherentPhrase => "known_incoherent_phrase",
            IncoherenceReason::ImplausibleAction => "implausible_action",
            IncoherenceReason::NoGrammaticalStructure => "no_grammatical_structure",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Returns `true` if `text` passes every coherence rule.
pub fn is_coherent(text: &str) -> bool {
    check_coherence(text).is_ok()
}

/// Runs the coherence rules in order, returning the first one that rejects.
pub fn check_coherence(text: &str) -> Result<(), IncoherenceReason> {
    let text = text.trim();
    if text.is_empty() {
        return Err(IncoherenceReason::Empty);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(IncoherenceReason::TooFewTokens);
    }

    let word_chars: String = text
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();
    if word_chars.trim().chars().count() < 3 {
        return Err(IncoherenceReason::TooFewCharacters);
    }

    let distinct_alphabetic: HashSet<String> = tokens
        .iter()
        .filter(|t| t.chars().all(char::is_alphabetic))
        .map(|t| t.to_lowercase())
        .collect();
    if distinct_alphabetic.len() < 2 {
        return Err(IncoherenceReason::Repetitive);
    }

    let lowered = text.to_lowercase();
    if INCOHERENT_PHRASES.contains(&lowered.as_str()) {
        return Err(IncoherenceReason::KnownIncoherentPhrase);
    }

    let lowered_tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    if let [first, second, _] = lowered_tokens.as_slice() {
        if PHYSICAL_OBJECTS.contains(&first.as_str())
            && IMPOSSIBLE_ACTIONS.contains(&second.as_str())
        {
            return Err(IncoherenceReason::ImplausibleAction);
        }
    }

    if !lowered_tokens
        .iter()
        .any(|t| STRUCTURE_WORDS.contains(&t.as_str()))
    {
        return Err(IncoherenceReason::NoGrammaticalStructure);
    }

    Ok(())
}

/// Word characters: letters, digits, and underscore.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token_is_rejected() {
        assert!(!is_coherent("perro"));
        assert_eq!(check_coherence("perro"), Err(IncoherenceReason::TooFewTokens));
    }

    #[test]
    fn test_empty_and_whitespace_are_rejected() {
        assert_eq!(check_coherence(""), Err(IncoherenceReason::Empty));
        assert_eq!(check_coherence(" \n\t "), Err(IncoherenceReason::Empty));
    }

    #[test]
    fn test_denylisted_phrase_is_rejected_case_insensitively() {
        assert!(!is_coherent("casa azul mojado"));
        assert_eq!(
            check_coherence("  Casa Azul MOJADO "),
            Err(IncoherenceReason::KnownIncoherentPhrase)
        );
    }

    #[test]
    fn test_ordinary_sentence_is_coherent() {
        assert!(is_coherent("el comentario es interesante"));
        assert!(is_coherent("Deberían mejorar la cafetería"));
        assert!(is_coherent("El maestro es malo"));
    }

    #[test]
    fn test_punctuation_only_is_rejected() {
        assert_eq!(check_coherence("!! ??"), Err(IncoherenceReason::TooFewCharacters));
        assert_eq!(check_coherence("a !"), Err(IncoherenceReason::TooFewCharacters));
    }

    #[test]
    fn test_repeated_word_is_rejected() {
        assert_eq!(check_coherence("no no no no"), Err(IncoherenceReason::Repetitive));
        assert_eq!(check_coherence("Hola HOLA hola"), Err(IncoherenceReason::Repetitive));
        // Numbers are not alphabetic tokens.
        assert_eq!(check_coherence("la 123 456"), Err(IncoherenceReason::Repetitive));
    }

    #[test]
    fn test_object_with_impossible_action_is_rejected() {
        assert_eq!(
            check_coherence("mesa cantar fuerte"),
            Err(IncoherenceReason::ImplausibleAction)
        );
    }

    #[test]
    fn test_object_action_rule_only_applies_to_three_tokens() {
        // Four tokens with a structure word: the object/action rule does not apply.
        assert!(is_coherent("mesa cantar en casa"));
    }

    #[test]
    fn test_no_function_word_is_rejected() {
        assert_eq!(
            check_coherence("gato negro grande"),
            Err(IncoherenceReason::NoGrammaticalStructure)
        );
    }

    #[test]
    fn test_function_word_with_trailing_punctuation_does_not_count() {
        // Tokens are compared verbatim after lowercasing.
        assert_eq!(
            check_coherence("gato negro y."),
            Err(IncoherenceReason::NoGrammaticalStructure)
        );
    }

    #[test]
    fn test_any_two_token_text_with_function_word_is_coherent() {
        for word in STRUCTURE_WORDS {
            let text = format!("{word} estudiante");
            assert!(is_coherent(&text), "expected coherent: {text}");
        }
    }

    #[test]
    fn test_gate_is_deterministic() {
        let text = "la biblioteca cierra muy temprano";
        assert_eq!(check_coherence(text), check_coherence(text));
    }
}
