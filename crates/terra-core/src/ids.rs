//! Newtype identifiers for the domain entities.
//!
//! The source system keys everything off opaque external strings; wrapping
//! them here stops an `AccountId` being passed where a `RepId` is expected
//! without the compiler noticing.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(AccountId);
string_id!(RepId);
string_id!(OpportunityId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types_with_equal_display() {
        let account = AccountId::from("a-1");
        let rep = RepId::from("a-1");
        assert_eq!(account.to_string(), rep.to_string());
    }

    #[test]
    fn ids_sort_lexically() {
        let mut reps = vec![RepId::from("r-2"), RepId::from("r-10"), RepId::from("r-1")];
        reps.sort();
        assert_eq!(reps, vec![RepId::from("r-1"), RepId::from("r-10"), RepId::from("r-2")]);
    }
}
