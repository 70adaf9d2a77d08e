//! Similarity scoring and greedy matching of legacy and current members.

use crate::identifier::DescriptionResolver;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use typestore_schema::{Member, TypeMember, TypeNameResolver};

/// Normalized Levenshtein similarity in `[0, 1]`. Two empty strings are identical.
#[must_use]
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    1.0 - previous[b.len()] as f64 / longest as f64
}

/// Configured compatibility scores between type names. Lookup is symmetric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSimilarityTable {
    scores: HashMap<(String, String), f64>,
}

impl TypeSimilarityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        }
    }

    pub fn insert(&mut self, a: &str, b: &str, score: f64) {
        self.scores.insert(Self::key(a, b), score.clamp(0.0, 1.0));
    }

    #[must_use]
    pub fn lookup(&self, a: &str, b: &str) -> Option<f64> {
        self.scores.get(&Self::key(a, b)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Scores legacy/current member pairs as `(name + type) / 2`.
pub struct MemberSimilator<'a> {
    pub resolver: &'a dyn TypeNameResolver,
    pub descriptions: &'a DescriptionResolver,
    pub table: &'a TypeSimilarityTable,
}

impl MemberSimilator<'_> {
    #[must_use]
    pub fn score(&self, legacy: &Member, current: &Member) -> f64 {
        let name_similarity = levenshtein_ratio(legacy.name(), current.name());
        (name_similarity + self.type_similarity(legacy, current)) / 2.0
    }

    /// 1.0 for the same type, else the configured score, else 0.0. An
    /// unresolvable legacy type name is replaced by its refactoring target first.
    #[must_use]
    pub fn type_similarity(&self, legacy: &Member, current: &Member) -> f64 {
        let current_name = current.type_name();
        let legacy_name = match self.resolver.resolve(legacy.type_name()) {
            Some(_) => legacy.type_name(),
            None => self
                .descriptions
                .replacement_type_name(legacy.type_name())
                .unwrap_or(legacy.type_name()),
        };
        if legacy_name == current_name {
            return 1.0;
        }
        if let (Some(a), Some(b)) = (
            self.resolver.resolve(legacy_name),
            self.resolver.resolve(current_name),
        ) && a == b
        {
            return 1.0;
        }
        self.table.lookup(legacy_name, current_name).unwrap_or(0.0)
    }
}

/// Veto on a proposed legacy/current pair.
pub trait MatchValidator: Send + Sync {
    fn is_valid_match(&self, legacy: &Member, current: &Member) -> bool;
}

/// Accepts every pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

impl MatchValidator for AcceptAllValidator {
    fn is_valid_match(&self, _legacy: &Member, _current: &Member) -> bool {
        true
    }
}

/// Rejects fixed/variable length mixes and reference/value mixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthCompatibilityValidator;

impl MatchValidator for LengthCompatibilityValidator {
    fn is_valid_match(&self, legacy: &Member, current: &Member) -> bool {
        legacy.is_fixed_length() == current.is_fixed_length()
            && legacy.is_reference() == current.is_reference()
    }
}

/// How a legacy/current pair was established.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// From the refactoring mapping.
    Explicit,
    /// Same type name and simple name.
    Equal,
    /// Heuristic match with this score.
    Matched(f64),
}

impl Similarity {
    /// Score of the pair; explicit mappings rank above any heuristic match.
    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Self::Explicit => 2.0,
            Self::Equal => 1.0,
            Self::Matched(score) => *score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberMatch {
    pub legacy: usize,
    pub current: usize,
    pub similarity: Similarity,
}

/// Greedy, deterministic bipartite matcher.
///
/// Exact `(type name, name)` pairs are linked first. Remaining pairs scoring at
/// least the threshold are accepted by descending score, then ascending legacy
/// index, then ascending current index.
#[derive(Clone)]
pub struct MemberMatcher {
    threshold: f64,
    validator: Arc<dyn MatchValidator>,
}

impl MemberMatcher {
    pub const DEFAULT_THRESHOLD: f64 = 0.5;

    #[must_use]
    pub fn new(threshold: f64, validator: Arc<dyn MatchValidator>) -> Self {
        Self {
            threshold,
            validator,
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn validator(&self) -> Arc<dyn MatchValidator> {
        Arc::clone(&self.validator)
    }

    /// Matches the members at `legacy_pool` against those at `current_pool`.
    /// Pools hold indices into `legacy` and `current`.
    #[must_use]
    pub fn match_members(
        &self,
        legacy: &[Member],
        legacy_pool: &[usize],
        current: &[Member],
        current_pool: &[usize],
        similator: &MemberSimilator<'_>,
    ) -> Vec<MemberMatch> {
        let mut matches = Vec::new();
        let mut legacy_taken = BTreeSet::new();
        let mut current_taken = BTreeSet::new();

        // Identical unique names pair before names that only agree unqualified.
        let exact_passes: [fn(&Member, &Member) -> bool; 2] = [
            |l, c| l.is_identical(c) && l.type_name() == c.type_name(),
            Member::equals_structure,
        ];
        for equal in exact_passes {
            for &l in legacy_pool {
                if legacy_taken.contains(&l) {
                    continue;
                }
                let found = current_pool
                    .iter()
                    .copied()
                    .find(|c| !current_taken.contains(c) && equal(&legacy[l], &current[*c]));
                if let Some(c) = found {
                    legacy_taken.insert(l);
                    current_taken.insert(c);
                    matches.push(MemberMatch {
                        legacy: l,
                        current: c,
                        similarity: Similarity::Equal,
                    });
                }
            }
        }

        let mut candidates = Vec::new();
        for &l in legacy_pool.iter().filter(|l| !legacy_taken.contains(*l)) {
            for &c in current_pool.iter().filter(|c| !current_taken.contains(*c)) {
                let score = similator.score(&legacy[l], &current[c]);
                if score >= self.threshold
                    && self.validator.is_valid_match(&legacy[l], &current[c])
                {
                    candidates.push((score, l, c));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        for (score, l, c) in candidates {
            if legacy_taken.contains(&l) || current_taken.contains(&c) {
                continue;
            }
            legacy_taken.insert(l);
            current_taken.insert(c);
            matches.push(MemberMatch {
                legacy: l,
                current: c,
                similarity: Similarity::Matched(score),
            });
        }

        matches.sort_by_key(|m| m.legacy);
        matches
    }
}

impl Default for MemberMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD, Arc::new(LengthCompatibilityValidator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_ratio_bounds() {
        assert_eq!(levenshtein_ratio("", ""), 1.0);
        assert_eq!(levenshtein_ratio("name", "name"), 1.0);
        assert_eq!(levenshtein_ratio("abc", "xyz"), 0.0);
        assert!((levenshtein_ratio("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn type_table_lookup_is_symmetric() {
        let mut table = TypeSimilarityTable::new();
        table.insert("int", "long", 0.8);
        assert_eq!(table.lookup("long", "int"), Some(0.8));
        assert_eq!(table.lookup("int", "short"), None);
    }
}
