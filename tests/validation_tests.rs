mod common;

use common::{broken_dea, prescriber, solve_dea};
use rxpad_server::models::{PracticeLocation, Prescriber};
use rxpad_server::validation::{
    format_phone, validate_dea, validate_npi, validate_practice, validate_prescriber,
    DEA_CHECKSUM_MESSAGE, DEA_FORMAT_MESSAGE, NPI_FORMAT_MESSAGE,
};

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_empty_dea_is_valid() {
        let check = validate_dea("");
        assert!(check.valid);
        assert!(check.message.is_empty());
    }

    #[test]
    fn test_whitespace_around_identifiers_is_rejected() {
        let dea = solve_dea("AB", [1, 2, 3, 4, 5, 6]);
        for input in ["   ".to_string(), format!(" {} ", dea), format!("{}\t", dea)] {
            let check = validate_dea(&input);
            assert!(!check.valid, "{:?} should be rejected", input);
            assert_eq!(check.message, DEA_FORMAT_MESSAGE);
        }

        for input in [" ", " 1234567890", "1234567890 "] {
            let check = validate_npi(input);
            assert!(!check.valid, "{:?} should be rejected", input);
            assert_eq!(check.message, NPI_FORMAT_MESSAGE);
        }
    }

    #[test]
    fn test_dea_format_is_enforced() {
        for bad in ["A1234567", "AB123456", "AB12345678", "1B1234567", "AB12C4567", "ABC"] {
            let check = validate_dea(bad);
            assert!(!check.valid, "{} should be rejected", bad);
            assert_eq!(check.message, DEA_FORMAT_MESSAGE);
        }
    }

    #[test]
    fn test_documented_example_fails_checksum() {
        // 1+3+5 + 2*(2+4+6) = 33, check digit 7 does not match
        let check = validate_dea("AB1234567");
        assert!(!check.valid);
        assert_eq!(check.message, DEA_CHECKSUM_MESSAGE);
    }

    #[test]
    fn test_solved_fixtures_pass_checksum() {
        let fixtures = [
            [1, 2, 3, 4, 5, 6],
            [0, 0, 0, 0, 0, 0],
            [9, 9, 9, 9, 9, 9],
            [4, 8, 1, 5, 2, 9],
            [7, 0, 3, 1, 8, 2],
        ];
        for digits in fixtures {
            let dea = solve_dea("FC", digits);
            assert!(validate_dea(&dea).valid, "{} should pass", dea);
            assert!(validate_dea(&dea.to_lowercase()).valid);

            let broken = broken_dea("FC", digits);
            let check = validate_dea(&broken);
            assert!(!check.valid, "{} should fail", broken);
            assert_eq!(check.message, DEA_CHECKSUM_MESSAGE);
        }
    }

    #[test]
    fn test_npi() {
        assert!(validate_npi("").valid);
        assert!(validate_npi("1234567890").valid);

        for bad in ["123456789", "12345678901", "12345abcde", "123-456-78"] {
            let check = validate_npi(bad);
            assert!(!check.valid);
            assert_eq!(check.message, NPI_FORMAT_MESSAGE);
        }
    }

    #[test]
    fn test_format_phone_progressive() {
        assert_eq!(format_phone("5205550123"), "(520) 555-0123");
        assert_eq!(format_phone("520"), "520");
        assert_eq!(format_phone("5205"), "(520) 5");
        assert_eq!(format_phone("520555"), "(520) 555");
        assert_eq!(format_phone("5205550"), "(520) 555-0");
        assert_eq!(format_phone("(520) 555-0123"), "(520) 555-0123");
        assert_eq!(format_phone("phone"), "");
    }

    #[test]
    fn test_empty_practice_reports_every_required_field() {
        let outcome = validate_practice(&PracticeLocation::default());
        assert!(!outcome.valid);
        for field in ["name", "address", "city", "state", "zip", "phone"] {
            assert!(outcome.errors.contains_key(field), "missing {}", field);
        }
        assert!(!outcome.errors.contains_key("fax"));
    }

    #[test]
    fn test_practice_becomes_valid_when_filled() {
        let mut practice = PracticeLocation::default();
        for step in 0..6 {
            let outcome = validate_practice(&practice);
            assert!(!outcome.valid);
            assert_eq!(outcome.errors.len(), 6 - step);

            let value = format!("value {}", step);
            match step {
                0 => practice.name = value,
                1 => practice.address = value,
                2 => practice.city = value,
                3 => practice.state = value,
                4 => practice.zip = value,
                _ => practice.phone = value,
            }
        }
        let outcome = validate_practice(&practice);
        assert!(outcome.valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let practice = PracticeLocation {
            name: "   ".to_string(),
            ..common::practice("x")
        };
        let outcome = validate_practice(&practice);
        assert_eq!(outcome.errors["name"], "Practice name is required");
    }

    #[test]
    fn test_prescriber_rules() {
        assert!(validate_prescriber(&prescriber("Ana Ruiz")).valid);

        let outcome = validate_prescriber(&Prescriber::default());
        assert!(!outcome.valid);
        assert!(outcome.errors.contains_key("name"));
        assert!(outcome.errors.contains_key("credentials"));
        assert!(!outcome.errors.contains_key("dea_number"));

        let bad_ids = Prescriber {
            npi_number: "123".to_string(),
            dea_number: broken_dea("BW", [4, 8, 1, 5, 2, 9]),
            ..prescriber("Ana Ruiz")
        };
        let outcome = validate_prescriber(&bad_ids);
        assert_eq!(outcome.errors["npi_number"], NPI_FORMAT_MESSAGE);
        assert_eq!(outcome.errors["dea_number"], DEA_CHECKSUM_MESSAGE);
    }
}
