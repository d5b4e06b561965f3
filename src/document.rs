//! CPF/CNPJ normalization and checksum validation.
//!
//! Both identifiers end with two check digits computed by a weighted sum modulo 11 over the preceding digits. The
//! functions here are pure; producers' repository calls [`validate_document`] before anything is persisted.

use crate::error::ValidationError;
use crate::types::DocumentType;

/// Strip everything but ASCII digits.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn digits_of(raw: &str, kind: DocumentType) -> Option<Vec<u32>> {
    let digits: Vec<u32> = normalize(raw).chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != kind.digits() {
        return None;
    }

    // A string of identical digits passes the checksum but is never issued.
    if digits.iter().all(|d| *d == digits[0]) {
        return None;
    }

    Some(digits)
}

fn cpf_check_digit(digits: &[u32], count: usize) -> u32 {
    let top = count as u32 + 1;
    let sum: u32 = digits[..count]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    match (sum * 10) % 11 {
        10 | 11 => 0,
        rest => rest,
    }
}

/// Validate an 11-digit CPF.
pub fn validate_cpf(digits: &str) -> bool {
    let Some(digits) = digits_of(digits, DocumentType::Cpf)
    else {
        return false;
    };

    cpf_check_digit(&digits, 9) == digits[9] && cpf_check_digit(&digits, 10) == digits[10]
}

// Weights run right-to-left starting at 2, growing to 9 and wrapping back to 2.
fn cnpj_check_digit(digits: &[u32], pos: usize) -> u32 {
    let mut weight = pos as u32 - 7;
    let mut sum = 0;

    for d in &digits[..pos] {
        sum += d * weight;
        weight -= 1;
        if weight < 2 {
            weight = 9;
        }
    }

    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

/// Validate a 14-digit CNPJ.
pub fn validate_cnpj(digits: &str) -> bool {
    let Some(digits) = digits_of(digits, DocumentType::Cnpj)
    else {
        return false;
    };

    cnpj_check_digit(&digits, 12) == digits[12] && cnpj_check_digit(&digits, 13) == digits[13]
}

/// Normalize `raw` and validate it as a document of the given kind. Returns the digits-only form.
pub fn validate_document(kind: DocumentType, raw: &str) -> Result<String, ValidationError> {
    let digits = normalize(raw);

    let valid = match kind {
        DocumentType::Cpf => validate_cpf(&digits),
        DocumentType::Cnpj => validate_cnpj(&digits),
    };

    if valid {
        Ok(digits)
    }
    else {
        Err(ValidationError::InvalidDocument {
            kind,
            document: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize("123.456.789-09"), "12345678909");
        assert_eq!(normalize("40.703.515/0001-72"), "40703515000172");
        assert_eq!(normalize(" a1b2 "), "12");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn cpf() {
        assert!(validate_cpf("12345678909"));
        assert!(validate_cpf("52998224725"));
        assert!(validate_cpf("111.444.777-35"));

        assert!(!validate_cpf("11111111111"));
        assert!(!validate_cpf("00000000000"));
        assert!(!validate_cpf("123456789"));
        assert!(!validate_cpf("123456789091"));
        // Last digit flipped.
        assert!(!validate_cpf("12345678908"));
        // First check digit wrong, second would be right for it.
        assert!(!validate_cpf("52998224715"));
    }

    #[test]
    fn cnpj() {
        assert!(validate_cnpj("40703515000172"));
        assert!(validate_cnpj("11222333000181"));
        assert!(validate_cnpj("11.444.777/0001-61"));

        assert!(!validate_cnpj("11111111111111"));
        assert!(!validate_cnpj("4070351500017"));
        assert!(!validate_cnpj("40703515000173"));
        assert!(!validate_cnpj("40703515000162"));
        // A valid CPF is not a CNPJ.
        assert!(!validate_cnpj("12345678909"));
    }

    #[test]
    fn document_dispatch() {
        assert_eq!(
            validate_document(DocumentType::Cpf, "123.456.789-09").unwrap(),
            "12345678909"
        );
        assert_eq!(
            validate_document(DocumentType::Cnpj, "40.703.515/0001-72").unwrap(),
            "40703515000172"
        );

        match validate_document(DocumentType::Cnpj, "123.456.789-09") {
            Err(ValidationError::InvalidDocument { kind, document }) => {
                assert_eq!(kind, DocumentType::Cnpj);
                assert_eq!(document, "123.456.789-09");
            }
            other => panic!("Expected InvalidDocument, got {other:?}"),
        }
    }
}
