//! Fragment Extraction
//!
//! Pulls the fenced document body out of a raw model reply.

/// Closing fence; the body never includes the newline before it.
const CLOSING_FENCE: &str = "\n```";

/// Document body of one model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Text between the fences, byte for byte
    Body(String),
    /// The reply had no complete fenced block
    Missing,
}

impl Fragment {
    /// Body text; a missing fragment reads as empty.
    pub fn as_str(&self) -> &str {
        match self {
            Fragment::Body(text) => text,
            Fragment::Missing => "",
        }
    }

    /// Length in characters (0 when missing).
    pub fn char_len(&self) -> usize {
        self.as_str().chars().count()
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Fragment::Missing)
    }

    pub fn into_string(self) -> String {
        match self {
            Fragment::Body(text) => text,
            Fragment::Missing => String::new(),
        }
    }
}

/// Return the text between the first `` ```{label}\n `` and the first
/// following `` \n``` ``.
pub fn extract_fragment(reply: &str, label: &str) -> Fragment {
    let opening = format!("```{}\n", label);
    let Some(open_at) = reply.find(&opening) else {
        return Fragment::Missing;
    };
    let rest = &reply[open_at + opening.len()..];
    match rest.find(CLOSING_FENCE) {
        Some(close_at) => Fragment::Body(rest[..close_at].to_string()),
        None => Fragment::Missing,
    }
}
