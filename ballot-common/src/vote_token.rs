//! Voted-questions client token
//!
//! One-vote-per-question enforcement rides on a client-side cookie holding a
//! comma-separated list of question ids, e.g. `"3,7,12"`. The server checks
//! the candidate question against the list before accepting a vote and
//! appends the id after counting it.
//!
//! Matching is by exact decimal field, not numeric value. Question ids are
//! serialized with [`i64`]'s `Display`, which never produces leading zeros or
//! whitespace, so a well-formed token only ever contains canonical fields. A
//! field like `"07"` written by anything else simply never matches and that
//! question can be voted on again; garbage fields are inert rather than an
//! error.

use std::fmt;

/// Comma-separated list of question ids the client has already voted on
///
/// The raw string is kept verbatim. Appending never deduplicates and the
/// token grows without bound; the cookie expiry bounds its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VotedToken(String);

impl VotedToken {
    /// Empty token for a client that has not voted yet
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Read a token from an optional cookie value
    ///
    /// A missing cookie and an empty string both mean "no votes recorded".
    /// Any other string is taken verbatim; there is no failure case.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) => Self(s.to_string()),
            None => Self::new(),
        }
    }

    /// True when no votes are recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `question_id` is recorded in the token
    ///
    /// Compares each comma-delimited field against the decimal form of the
    /// id. Substrings never match: `"12"` records neither 1 nor 2.
    pub fn contains(&self, question_id: i64) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let wanted = question_id.to_string();
        self.0.split(',').any(|field| field == wanted)
    }

    /// Record a vote for `question_id`, returning the grown token
    ///
    /// The caller is expected to have checked [`contains`](Self::contains)
    /// first; appending an already-present id records it twice.
    pub fn append(&self, question_id: i64) -> Self {
        if self.0.is_empty() {
            Self(question_id.to_string())
        } else {
            Self(format!("{},{}", self.0, question_id))
        }
    }

    /// Raw token string, suitable for a Set-Cookie value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VotedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
