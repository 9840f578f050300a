//! Wire request for the remote solver service.

/// A solve request: the standard LP-format text document, sent as the
/// literal request body with `Content-Type: text/plain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProblem {
    pub lp_text: String,
}

impl RemoteProblem {
    pub fn new(lp_text: impl Into<String>) -> Self {
        Self {
            lp_text: lp_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_lp_text_verbatim() {
        let p = RemoteProblem::new("Maximize\n obj: x\nEnd\n");
        assert!(p.lp_text.starts_with("Maximize"));
    }
}
