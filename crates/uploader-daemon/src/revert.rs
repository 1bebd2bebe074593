//! Revert-reason classification, resolving the `switch` stub left
//! unimplemented in `goimpl/uploader/uploader.go::FollowTx`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    /// The root was already posted by someone else between our fetch and
    /// our submission — treat as success, drop from `Pending`.
    AlreadyPosted,
    /// Anything else: fatal for this reward, not retried automatically.
    Fatal,
}

/// Classifies a revert reason string. Deliberately conservative: only
/// messages that clearly indicate "someone already posted this root" are
/// treated as the success path; everything else is fatal.
pub fn classify(revert_reason: &str) -> RevertOutcome {
    let lowered = revert_reason.to_ascii_lowercase();
    let already_posted = ["already posted", "poster already set", "reward already posted"]
        .iter()
        .any(|needle| lowered.contains(needle));
    if already_posted {
        RevertOutcome::AlreadyPosted
    } else {
        RevertOutcome::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_already_posted_variants() {
        assert_eq!(classify("revert: reward already posted"), RevertOutcome::AlreadyPosted);
        assert_eq!(classify("Poster already set for this root"), RevertOutcome::AlreadyPosted);
    }

    #[test]
    fn anything_else_is_fatal() {
        assert_eq!(classify("invalid signature"), RevertOutcome::Fatal);
        assert_eq!(classify("execution reverted"), RevertOutcome::Fatal);
        assert_eq!(classify(""), RevertOutcome::Fatal);
    }
}
