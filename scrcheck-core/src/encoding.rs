//! Encoding and locale resolution
//!
//! Legacy source files are lexed as Latin-1 so that every byte survives as
//! one `char`; each segment is then converted with the converter of its own
//! writing system. Unicode files bypass conversion entirely.

use crate::domain::{MarkerDomain, SourceDomain};
use crate::error::{CoreError, Result};
use crate::writing_system::WritingSystemRegistry;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Decoded file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceText {
    /// Already Unicode; never passed through a converter
    Unicode(String),
    /// Bytes widened one-to-one into chars, pending per-segment conversion
    Legacy(String),
}

impl SourceText {
    pub fn as_str(&self) -> &str {
        match self {
            SourceText::Unicode(text) | SourceText::Legacy(text) => text,
        }
    }

    pub fn is_unicode(&self) -> bool {
        matches!(self, SourceText::Unicode(_))
    }
}

/// Decides whether raw file bytes are Unicode.
///
/// A byte-order mark, or valid UTF-8 with at least one non-ASCII character,
/// means Unicode. Anything else is legacy data.
pub fn decode_source(bytes: &[u8]) -> SourceText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return SourceText::Unicode(text.into_owned());
    }
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.is_ascii() => SourceText::Unicode(text.to_string()),
        _ => SourceText::Legacy(encoding_rs::mem::decode_latin1(bytes).into_owned()),
    }
}

/// Maps (writing system, domain) to converters.
#[derive(Debug, Clone)]
pub struct EncodingResolver {
    registry: Arc<WritingSystemRegistry>,
    /// Writing systems already warned about for lacking a converter
    warned: Arc<Mutex<HashSet<String>>>,
}

impl EncodingResolver {
    pub fn new(registry: Arc<WritingSystemRegistry>) -> Self {
        Self {
            registry,
            warned: Arc::default(),
        }
    }

    pub fn registry(&self) -> &WritingSystemRegistry {
        &self.registry
    }

    /// Writing system of text in `domain` coming from a `source` file.
    ///
    /// A marker's locale override wins; back translations and annotations
    /// use the file's declared locale, else the analysis default; everything
    /// else is vernacular.
    pub fn writing_system_for(
        &self,
        source: &SourceDomain,
        domain: MarkerDomain,
        locale_override: Option<&str>,
    ) -> String {
        if let Some(locale) = locale_override {
            return locale.to_string();
        }
        if domain.contains(MarkerDomain::BACK_TRANS) || domain.contains(MarkerDomain::NOTE) {
            return source
                .locale()
                .unwrap_or_else(|| self.registry.analysis())
                .to_string();
        }
        self.registry.vernacular().to_string()
    }

    /// Converter for `writing_system`; `None` when none is configured.
    pub fn converter(&self, writing_system: &str) -> Result<Option<&'static Encoding>> {
        let Some(label) = self
            .registry
            .get(writing_system)
            .and_then(|ws| ws.legacy_encoding.as_deref())
        else {
            return Ok(None);
        };
        Encoding::for_label(label.as_bytes())
            .map(Some)
            .ok_or_else(|| CoreError::MissingConverter {
                writing_system: writing_system.to_string(),
                encoding: label.to_string(),
            })
    }

    /// Converts Latin-1-widened legacy text of one writing system to Unicode.
    ///
    /// Without a converter the bytes are read as UTF-8 when they are valid
    /// UTF-8 and kept as Latin-1 otherwise.
    pub fn convert(&self, writing_system: &str, widened: &str) -> Result<String> {
        let bytes: Cow<'_, [u8]> = encoding_rs::mem::encode_latin1_lossy(widened);
        match self.converter(writing_system)? {
            Some(encoding) => Ok(encoding.decode_without_bom_handling(&bytes).0.into_owned()),
            None => match std::str::from_utf8(&bytes) {
                Ok(text) => Ok(text.to_string()),
                Err(_) => {
                    self.warn_unconverted(writing_system);
                    Ok(widened.to_string())
                }
            },
        }
    }

    fn warn_unconverted(&self, writing_system: &str) {
        let first = self
            .warned
            .lock()
            .map(|mut warned| warned.insert(writing_system.to_string()))
            .unwrap_or(true);
        if first {
            log::warn!(
                "no legacy encoding configured for '{writing_system}'; non-UTF-8 text read as Latin-1"
            );
        }
    }
}
