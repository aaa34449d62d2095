//! Translation seam for user-facing strings.
//!
//! # Responsibility
//! - Route every user-facing message through one `translate(key, params)`
//!   lookup.
//! - Provide a built-in English table so core works without a host UI.
//!
//! # Invariants
//! - Translation is a pure lookup; unknown keys render as the key itself.
//! - At most one translator can be installed per process.

use once_cell::sync::OnceCell;

/// Host-provided translation lookup.
pub trait Translator {
    /// Returns the message for `key`, substituting `{name}` placeholders from
    /// `params`.
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

static TRANSLATOR: OnceCell<Box<dyn Translator + Send + Sync>> = OnceCell::new();

const ENGLISH: &[(&str, &str)] = &[
    ("invalid-name", "Invalid name"),
    ("invalid-id", "Invalid ID"),
    ("invalid-latitude", "Invalid latitude"),
    ("invalid-longitude", "Invalid longitude"),
    ("invalid-timestamp", "Invalid timestamp"),
    ("duplicate-name", "Duplicate name"),
    ("duplicate-id", "Duplicate ID"),
    ("invalid-unit", "Invalid unit"),
    ("invalid-min-max", "Invalid min/max value"),
    ("invalid-precision", "Invalid precision"),
    ("invalid-value", "Invalid value"),
    ("invalid-meas-type", "Invalid measurement type"),
    ("no-start-time", "No start time"),
    ("no-end-time", "No end time"),
    ("times-order", "End time is before start time"),
    ("no-timestamp", "No timestamp"),
    ("no-min", "No minimum value"),
    ("no-max", "No maximum value"),
    ("no-precision", "No precision"),
    ("meas-below-min", "Value below minimum"),
    ("meas-above-max", "Value above maximum"),
    ("samp-type-undef", "Sample type is undefined"),
    ("quality-undef", "Subjective quality is undefined"),
    ("no-measurements", "No measurements"),
    ("meas-not-taken", "{count} planned measurement(s) not taken"),
    ("no-samples", "No samples"),
    ("tasks-not-completed", "{count} task(s) not completed"),
    ("check-not-completed", "{count} checklist item(s) not completed"),
    ("planned-loc-remain", "{count} planned location(s) not visited"),
    ("no-locations", "No sampling locations"),
    ("coords-drift", "Actual coordinates are {dist} m from the nominal coordinates"),
    ("list-duplicates", "List contains duplicate entries"),
    ("list-empty-lines", "List contains empty lines"),
];

/// Built-in English message table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTranslator;

impl Translator for EnglishTranslator {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        let template = ENGLISH
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, text)| *text)
            .unwrap_or(key);
        substitute(template, params)
    }
}

/// Installs the process-wide translator.
///
/// # Errors
/// - Returns an error when a translator was already installed.
pub fn install_translator(translator: Box<dyn Translator + Send + Sync>) -> Result<(), String> {
    TRANSLATOR
        .set(translator)
        .map_err(|_| "translator already installed; refusing to replace it".to_string())
}

/// Translates `key` without parameters.
pub fn tr(key: &str) -> String {
    tr_with(key, &[])
}

/// Translates `key` with `{name}` placeholder parameters.
pub fn tr_with(key: &str, params: &[(&str, String)]) -> String {
    match TRANSLATOR.get() {
        Some(translator) => translator.translate(key, params),
        None => EnglishTranslator.translate(key, params),
    }
}

fn substitute(template: &str, params: &[(&str, String)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
}
