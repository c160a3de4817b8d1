//! Translation with an explicit failure policy

use crate::records::TextRecord;
use crate::traits::Translator;
use clir_core::logging::targets;
use clir_core::{ClirError, ClirResult, TranslateErrorPolicy};
use tracing::warn;

/// Wraps a translator and applies a [`TranslateErrorPolicy`] to its failures.
///
/// - `KeepOriginal`: log the failure and return the untranslated text
/// - `Fail`: return `ClirError::Translation`
#[derive(Debug, Clone)]
pub struct PolicyTranslator<T> {
    inner: T,
    policy: TranslateErrorPolicy,
}

impl<T: Translator> PolicyTranslator<T> {
    /// Wrap `inner` with `policy`
    pub fn new(inner: T, policy: TranslateErrorPolicy) -> Self {
        PolicyTranslator { inner, policy }
    }

    /// Policy in effect
    pub fn policy(&self) -> TranslateErrorPolicy {
        self.policy
    }

    /// Translate the text of each record, keeping ids
    pub fn translate_records(&self, records: &[TextRecord]) -> ClirResult<Vec<TextRecord>> {
        records
            .iter()
            .map(|r| Ok(TextRecord::new(r.id.clone(), self.translate(&r.text)?)))
            .collect()
    }
}

impl<T: Translator> Translator for PolicyTranslator<T> {
    fn translate(&self, text: &str) -> ClirResult<String> {
        match self.inner.translate(text) {
            Ok(translated) => Ok(translated),
            Err(err) => match self.policy {
                TranslateErrorPolicy::KeepOriginal => {
                    warn!(
                        target: targets::COLLAB,
                        error = %err,
                        "Translation failed, keeping original text"
                    );
                    Ok(text.to_string())
                }
                TranslateErrorPolicy::Fail => Err(ClirError::Translation {
                    text: text.to_string(),
                    reason: err.to_string(),
                }),
            },
        }
    }
}
