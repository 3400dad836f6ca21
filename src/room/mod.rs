use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::user;

/// Separator between the two identity tokens of a room id. Identity tokens
/// containing it are an unhandled edge case: `members` refuses to parse such
/// an id rather than guessing where the split belongs.
const SEPARATOR: char = '_';

/// Canonical id of a two-party conversation room.
///
/// Derived from the sorted pair of participant identity tokens, so both
/// participants compute the same id independently.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Id(String);

impl Id {
    pub fn between(a: &user::Id, b: &user::Id) -> Self {
        let (first, second) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        Self(format!("{first}{SEPARATOR}{second}"))
    }

    /// The two identity tokens composing this id, in lexicographic order.
    pub fn members(&self) -> Option<(user::Id, user::Id)> {
        let mut parts = self.0.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => {
                Some((user::Id(a.to_owned()), user::Id(b.to_owned())))
            }
            _ => None,
        }
    }

    /// Whether `user` is one of the two participants. Compares whole tokens,
    /// so an identity that is a substring of another never matches.
    pub fn involves(&self, user: &user::Id) -> bool {
        self.members()
            .is_some_and(|(a, b)| a == *user || b == *user)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Id, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Id(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> user::Id {
        user::Id(s.to_owned())
    }

    #[test]
    fn derivation_is_commutative() {
        let a = uid("42");
        let b = uid("7");
        assert_eq!(Id::between(&a, &b), Id::between(&b, &a));
    }

    #[test]
    fn tokens_are_sorted_lexicographically() {
        // "17" < "9" as strings, digits notwithstanding
        assert_eq!(Id::between(&uid("9"), &uid("17")).as_str(), "17_9");
        assert_eq!(Id::between(&uid("a"), &uid("b")).as_str(), "a_b");
    }

    #[test]
    fn members_round_trip() {
        let id = Id::between(&uid("alice"), &uid("bob"));
        assert_eq!(id.members(), Some((uid("alice"), uid("bob"))));
    }

    #[test]
    fn involvement_is_exact_token_match() {
        let id = Id::between(&uid("12"), &uid("34"));
        assert!(id.involves(&uid("12")));
        assert!(id.involves(&uid("34")));
        // "1", "2" and "3" are substrings of the id but not members
        assert!(!id.involves(&uid("1")));
        assert!(!id.involves(&uid("2")));
        assert!(!id.involves(&uid("3")));
        assert!(!id.involves(&uid("12_34")));
    }

    #[test]
    fn separator_in_token_defeats_parsing() {
        let id = Id::between(&uid("a_b"), &uid("c"));
        assert_eq!(id.members(), None);
        assert!(!id.involves(&uid("a_b")));
    }
}
