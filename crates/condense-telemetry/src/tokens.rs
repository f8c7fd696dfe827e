//! Token estimation utilities

/// Average characters per token used when no other ratio is configured
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate token count from text at ~4 chars/token
pub fn estimate_tokens(text: &str) -> usize {
    estimate_tokens_with(text, CHARS_PER_TOKEN)
}

/// Estimate token count as character count divided by `chars_per_token`
pub fn estimate_tokens_with(text: &str, chars_per_token: usize) -> usize {
    text.chars().count() / chars_per_token.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_empty() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_estimate_tokens_prose() {
        let prose = "This is a simple sentence with natural language that should be counted at about four characters per token.";
        // 106 chars / 4
        assert_eq!(estimate_tokens(prose), 26);
    }

    #[test]
    fn test_estimate_tokens_counts_chars() {
        // 4 chars, 8 bytes
        assert_eq!(estimate_tokens("éééé"), 1);
    }

    #[test]
    fn test_zero_ratio_does_not_divide_by_zero() {
        assert_eq!(estimate_tokens_with("abc", 0), 3);
    }
}
