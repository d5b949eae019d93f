//! Single-use code generation for email verification and password reset.

use rand::Rng;

/// Length of generated codes.
pub const CODE_LENGTH: usize = 8;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a random code of [`CODE_LENGTH`] ASCII letters.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_codes_vary() {
        let codes: std::collections::HashSet<_> = (0..32).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }
}
