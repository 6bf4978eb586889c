//! Outbound clients for the remote store and the hosted model

pub mod gemini_client;
pub mod rest_store;

pub use gemini_client::{GeminiClient, GeminiError};
pub use rest_store::{RestStoreError, RestVoteStore};

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 300;

/// Cut an upstream error body down to something fit for a log line
pub(crate) fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
        body.push('…');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_char_boundary() {
        let cut = truncate_body("è".repeat(400));
        assert!(cut.ends_with('…'));
        assert!(cut.len() <= MAX_ERROR_BODY + '…'.len_utf8());
    }

    #[test]
    fn test_short_body_untouched() {
        assert_eq!(truncate_body("quota".to_string()), "quota");
    }
}
