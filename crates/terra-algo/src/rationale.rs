//! Rationale/priority-code generation for explainability (§6).
//!
//! Stable, machine-parseable format: `<CODE>: <Name> → <RepName>
//! (<details>)`. A secondary parser tolerates an accidental double-prefix
//! (e.g. `P4: P4: …`).

use crate::waterfall::PriorityCode;

/// Build the rationale string for one assignment.
pub fn format_rationale(
    code: PriorityCode,
    account_name: &str,
    rep_name: &str,
    details: &str,
) -> String {
    format!("{}: {} → {} ({})", code.code(), account_name, rep_name, details)
}

/// Extract the leading priority code from a rationale string, tolerating an
/// accidental double-prefix (`P4: P4: …` still parses as `P4`).
pub fn parse_priority_code(rationale: &str) -> Option<&str> {
    let first_colon = rationale.find(':')?;
    let code = rationale[..first_colon].trim();
    const KNOWN: &[&str] = &["P0", "P1", "P2", "P3", "P4", "P5", "P6", "P7", "RO"];
    if KNOWN.contains(&code) {
        Some(code)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_stable_prefix() {
        let rationale = format_rationale(PriorityCode::P2, "Acme", "Jane Doe", "same region and owner");
        assert_eq!(rationale, "P2: Acme → Jane Doe (same region and owner)");
    }

    #[test]
    fn parses_leading_code() {
        let rationale = format_rationale(PriorityCode::Ro, "Acme", "Jane Doe", "residual");
        assert_eq!(parse_priority_code(&rationale), Some("RO"));
    }

    #[test]
    fn tolerates_double_prefix() {
        assert_eq!(parse_priority_code("P4: P4: Acme → Jane (dup)"), Some("P4"));
    }

    #[test]
    fn unknown_prefix_is_none() {
        assert_eq!(parse_priority_code("Note: something else"), None);
    }
}
