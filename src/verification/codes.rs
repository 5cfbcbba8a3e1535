use rand::Rng;

pub const CODE_LENGTH: usize = 6;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Code the rider shows the restaurant when collecting an order.
pub fn generate_pickup_code() -> String {
    generate_code()
}

/// Code the customer hands the rider on arrival.
pub fn generate_confirmation_code() -> String {
    generate_code()
}

fn generate_code() -> String {
    let value = rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX);
    value.to_string()
}

/// True iff `code` is exactly six ASCII digits.
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{generate_confirmation_code, generate_pickup_code, is_valid_code_format};

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..1_000 {
            for code in [generate_pickup_code(), generate_confirmation_code()] {
                assert!(is_valid_code_format(&code), "bad code {code}");
                let value: u32 = code.parse().unwrap();
                assert!((100_000..=999_999).contains(&value));
            }
        }
    }

    #[test]
    fn generated_codes_are_not_constant() {
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_pickup_code()).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        assert!(!is_valid_code_format("12345"));
        assert!(!is_valid_code_format("1234567"));
        assert!(!is_valid_code_format("12a456"));
        assert!(!is_valid_code_format(""));
        assert!(!is_valid_code_format(" 12345"));
        assert!(!is_valid_code_format("١٢٣٤٥٦"));
        assert!(is_valid_code_format("123456"));
        assert!(is_valid_code_format("000000"));
    }
}
