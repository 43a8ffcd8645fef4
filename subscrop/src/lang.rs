//! Translating the 3-letter language codes found in BDN XML into the
//! 2-letter codes expected by the converter.

use isolang::Language;

use crate::errors::{Error, Result};

/// ISO 639-2/B "bibliographic" codes, and the ISO 639-2/T codes used for
/// the same language everywhere else. Based on
/// http://www.loc.gov/standards/iso639-2/ISO-639-2_utf-8.txt
#[rustfmt::skip]
static BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"), ("arm", "hye"), ("baq", "eus"), ("bur", "mya"),
    ("chi", "zho"), ("cze", "ces"), ("dut", "nld"), ("fre", "fra"),
    ("geo", "kat"), ("ger", "deu"), ("gre", "ell"), ("ice", "isl"),
    ("mac", "mkd"), ("mao", "mri"), ("may", "msa"), ("per", "fas"),
    ("rum", "ron"), ("slo", "slk"), ("tib", "bod"), ("wel", "cym"),
];

/// Look up the ISO 639-1 code for an ISO 639-2 code (either the /T or the
/// /B variant).
///
/// ```text
/// eng -> en, fra -> fr, fre -> fr, ger -> de
/// ```
pub fn alpha2_for(code: &str) -> Result<&'static str> {
    let normalized = code.trim().to_ascii_lowercase();
    let terminological = BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == normalized)
        .map(|(_, t)| *t)
        .unwrap_or(normalized.as_str());
    Language::from_639_3(terminological)
        .and_then(|lang| lang.to_639_1())
        .ok_or_else(|| Error::UnknownLanguage {
            code: code.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminological_codes() {
        assert_eq!(alpha2_for("eng").unwrap(), "en");
        assert_eq!(alpha2_for("fra").unwrap(), "fr");
        assert_eq!(alpha2_for("jpn").unwrap(), "ja");
    }

    #[test]
    fn bibliographic_codes() {
        assert_eq!(alpha2_for("fre").unwrap(), "fr");
        assert_eq!(alpha2_for("ger").unwrap(), "de");
        assert_eq!(alpha2_for("chi").unwrap(), "zh");
        assert_eq!(alpha2_for("DUT").unwrap(), "nl");
    }

    #[test]
    fn unknown_codes() {
        assert!(matches!(
            alpha2_for("qqq"),
            Err(Error::UnknownLanguage { ref code }) if code == "qqq"
        ));
        // Valid 639-3, but there is no 639-1 code for it.
        assert!(alpha2_for("haw").is_err());
        assert!(alpha2_for("").is_err());
    }
}
