//! Static lexical data and the canned fallback texts returned when a
//! pipeline run fails. The service never surfaces a raw error to callers;
//! it maps each failure onto one of these messages in the requested output
//! language, falling back to English for unknown languages.

pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "fi"];

const DEFAULT_LANGUAGE: &str = "en";

/// Keys for [`error_message`], matching the failure classification of the
/// report service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessageKey {
    NoMessagesForSelection,
    NoInterestingMessages,
    GeneralError,
}

#[must_use]
pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&language)
}

/// Canned, localized fallback text for a failed generation request.
#[must_use]
pub fn error_message(language: &str, key: ErrorMessageKey) -> &'static str {
    let language = if is_supported_language(language) {
        language
    } else {
        DEFAULT_LANGUAGE
    };
    match (language, key) {
        ("fi", ErrorMessageKey::NoMessagesForSelection) => {
            "Kommenteista ei löytynyt mitään raportoitavaa."
        }
        ("fi", ErrorMessageKey::NoInterestingMessages) => {
            "Kommenteista ei löytynyt mitään riittävän kiinnostavaa raportoitavaksi."
        }
        ("fi", ErrorMessageKey::GeneralError) => {
            "Raportin muodostamisessa tapahtui odottamaton virhe."
        }
        (_, ErrorMessageKey::NoMessagesForSelection) => {
            "The comments contained nothing that could be reported."
        }
        (_, ErrorMessageKey::NoInterestingMessages) => {
            "The comments contained nothing interesting enough to report."
        }
        (_, ErrorMessageKey::GeneralError) => {
            "An unexpected error occurred while generating the report."
        }
    }
}

/// Per-language conjunction used by the downstream realizer when combining
/// coordinated clauses. Registered in the shared registry at service
/// construction.
#[must_use]
pub fn conjunctions() -> Vec<(&'static str, &'static str)> {
    vec![("en", "and"), ("fi", "ja")]
}
