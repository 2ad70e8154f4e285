//! Anonymization mapper
//!
//! Before peer review each member identity is hidden behind an opaque
//! label (A, B, C). The assignment is a fresh random permutation per
//! consultation, so no label carries a stable meaning across requests.
//! The reviewer only ever sees labels; identities are restored afterwards.

use super::identity::MemberIdentity;
use crate::core::error::DomainError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque reviewer-facing label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AliasLabel {
    A,
    B,
    C,
}

impl AliasLabel {
    pub const ALL: [AliasLabel; 3] = [AliasLabel::A, AliasLabel::B, AliasLabel::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            AliasLabel::A => "A",
            AliasLabel::B => "B",
            AliasLabel::C => "C",
        }
    }
}

impl fmt::Display for AliasLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AliasLabel {
    type Err = String;

    /// Accepts `A`, `a`, `Response A`, `member A` and similar
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s
            .trim()
            .rsplit(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .next()
            .unwrap_or("")
            .trim_matches(|c: char| !c.is_ascii_alphanumeric());
        match token.to_ascii_uppercase().as_str() {
            "A" => Ok(AliasLabel::A),
            "B" => Ok(AliasLabel::B),
            "C" => Ok(AliasLabel::C),
            _ => Err(format!("not an alias label: {}", s)),
        }
    }
}

/// Bijection between member identities and alias labels.
///
/// Deliberately not serializable: the mapping lives only for one
/// consultation and is never shown to the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMap {
    /// `labels[identity.index()]` is the label of that identity
    labels: [AliasLabel; 3],
}

impl AliasMap {
    /// Fresh random assignment
    pub fn assign() -> Self {
        Self::assign_with(&mut rand::rng())
    }

    /// Random assignment from a caller-provided generator
    pub fn assign_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut labels = AliasLabel::ALL;
        labels.shuffle(rng);
        Self { labels }
    }

    /// Explicit assignment in `MemberIdentity::ALL` order.
    ///
    /// Fails unless the labels are a permutation of A, B, C.
    pub fn from_labels(labels: [AliasLabel; 3]) -> Result<Self, DomainError> {
        let mut sorted = labels;
        sorted.sort();
        if sorted != AliasLabel::ALL {
            return Err(DomainError::InvalidAliasMapping(format!(
                "{}, {}, {}",
                labels[0], labels[1], labels[2]
            )));
        }
        Ok(Self { labels })
    }

    pub fn label_of(&self, id: MemberIdentity) -> AliasLabel {
        self.labels[id.index()]
    }

    pub fn identity_of(&self, label: AliasLabel) -> MemberIdentity {
        // Total: `labels` is a permutation of ALL
        MemberIdentity::ALL
            .into_iter()
            .find(|id| self.labels[id.index()] == label)
            .unwrap_or(MemberIdentity::MemberA)
    }

    /// `(label, identity)` pairs ordered by label
    pub fn entries(&self) -> Vec<(AliasLabel, MemberIdentity)> {
        AliasLabel::ALL
            .into_iter()
            .map(|label| (label, self.identity_of(label)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_assign_is_bijection() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let map = AliasMap::assign_with(&mut rng);
            let labels: HashSet<_> = MemberIdentity::ALL.iter().map(|id| map.label_of(*id)).collect();
            assert_eq!(labels.len(), 3);
            for id in MemberIdentity::ALL {
                assert_eq!(map.identity_of(map.label_of(id)), id);
            }
        }
    }

    #[test]
    fn test_assign_varies_across_requests() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..200)
            .map(|_| AliasMap::assign_with(&mut rng).label_of(MemberIdentity::MemberA))
            .collect();
        assert_eq!(seen.len(), 3, "member_a should not always get the same label");
    }

    #[test]
    fn test_from_labels_rejects_duplicates() {
        assert!(AliasMap::from_labels([AliasLabel::A, AliasLabel::A, AliasLabel::C]).is_err());
        let map = AliasMap::from_labels([AliasLabel::C, AliasLabel::A, AliasLabel::B]).unwrap();
        assert_eq!(map.identity_of(AliasLabel::A), MemberIdentity::MemberB);
        assert_eq!(map.label_of(MemberIdentity::MemberA), AliasLabel::C);
    }

    #[test]
    fn test_entries_ordered_by_label() {
        let map = AliasMap::from_labels([AliasLabel::B, AliasLabel::C, AliasLabel::A]).unwrap();
        assert_eq!(
            map.entries(),
            vec![
                (AliasLabel::A, MemberIdentity::MemberC),
                (AliasLabel::B, MemberIdentity::MemberA),
                (AliasLabel::C, MemberIdentity::MemberB),
            ]
        );
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("A".parse::<AliasLabel>().unwrap(), AliasLabel::A);
        assert_eq!("b".parse::<AliasLabel>().unwrap(), AliasLabel::B);
        assert_eq!("Response C".parse::<AliasLabel>().unwrap(), AliasLabel::C);
        assert!("D".parse::<AliasLabel>().is_err());
        assert!("".parse::<AliasLabel>().is_err());
    }
}
