// Fixed country code set for address fields (ISO 3166-1 alpha-2).

use crate::validators::ValidationError;

/// ISO 3166-1 alpha-2 codes, officially assigned.
pub const COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT",
    "AU", "AW", "AX", "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI",
    "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS", "BT", "BV", "BW", "BY",
    "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK",
    "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL",
    "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR",
    "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS",
    "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW",
    "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP",
    "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM",
    "SN", "SO", "SR", "SS", "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF",
    "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR", "TT", "TV", "TW",
    "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

pub fn is_valid_code(code: &str) -> bool {
    COUNTRY_CODES.binary_search(&code).is_ok()
}

/// Country is a required field on RepCode and GeneralAccount.
pub fn validate_country(field: &str, code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    if !is_valid_code(code) {
        return Err(ValidationError::new(
            field,
            format!("'{}' is not a valid country code", code),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_sorted_for_binary_search() {
        let mut sorted = COUNTRY_CODES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, COUNTRY_CODES);
    }

    #[test]
    fn test_known_codes() {
        assert!(is_valid_code("US"));
        assert!(is_valid_code("MX"));
        assert!(is_valid_code("GB"));
        assert!(!is_valid_code("XX"));
        assert!(!is_valid_code("us"));
    }

    #[test]
    fn test_validate_country() {
        assert!(validate_country("country", "US").is_ok());

        let empty = validate_country("country", "").unwrap_err();
        assert!(empty.message.contains("required"));

        let bad = validate_country("country", "ZZ").unwrap_err();
        assert!(bad.message.contains("not a valid country code"));
    }
}
