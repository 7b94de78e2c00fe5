//! Clause evaluation.

use crate::evaluator::Evaluator;
use crate::flag::{Clause, Operator};
use crate::target::Target;
use regex::Regex;

/// Apply a non-segment operator to an attribute's text.
///
/// `values` must be non-empty; single-value operators read `values[0]`.
/// Comparisons are case-sensitive except [`Operator::Equal`], and
/// [`Operator::GreaterThan`] compares lexicographically.
pub fn compare(operator: Operator, text: &str, values: &[String]) -> bool {
    let Some(value) = values.first() else {
        return false;
    };

    match operator {
        Operator::StartsWith => text.starts_with(value.as_str()),
        Operator::EndsWith => text.ends_with(value.as_str()),
        Operator::Match => Regex::new(value)
            .map(|re| re.is_match(text))
            .unwrap_or(false),
        Operator::Contains => text.contains(value.as_str()),
        Operator::Equal => text.to_lowercase() == value.to_lowercase(),
        Operator::EqualSensitive => text == value,
        Operator::In => values.iter().any(|v| v == text),
        Operator::GreaterThan => text > value.as_str(),
        Operator::SegmentMatch | Operator::Unknown => false,
    }
}

impl Evaluator {
    /// Evaluate one clause against a target.
    ///
    /// Fails closed: no values, an unknown operator, or an attribute the
    /// target does not carry all yield `false`.
    pub(crate) fn evaluate_clause(&self, clause: &Clause, target: &Target) -> bool {
        if clause.values.is_empty() {
            return false;
        }

        match clause.operator {
            Operator::Unknown => false,
            Operator::SegmentMatch => self.is_target_in_segments(&clause.values, target),
            operator => match target.attribute(&clause.attribute) {
                Some(value) => compare(operator, &value.to_text(), &clause.values),
                None => false,
            },
        }
    }

    /// All clauses must match; an empty list matches.
    pub(crate) fn evaluate_clauses(&self, clauses: &[Clause], target: &Target) -> bool {
        clauses
            .iter()
            .all(|clause| self.evaluate_clause(clause, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Segment;
    use crate::testing::evaluator_with;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn clause(attribute: &str, operator: Operator, items: &[&str]) -> Clause {
        Clause::new(attribute, operator, values(items))
    }

    #[test]
    fn test_text_operators() {
        assert!(compare(Operator::StartsWith, "alice@example.com", &values(&["alice"])));
        assert!(!compare(Operator::StartsWith, "alice@example.com", &values(&["Alice"])));
        assert!(compare(Operator::EndsWith, "alice@example.com", &values(&["@example.com"])));
        assert!(compare(Operator::Contains, "alice@example.com", &values(&["@exa"])));
        assert!(!compare(Operator::Contains, "alice@example.com", &values(&["EXA"])));
    }

    #[test]
    fn test_equality_operators() {
        assert!(compare(Operator::Equal, "Alice", &values(&["aLICE"])));
        assert!(!compare(Operator::Equal, "Alice", &values(&["Alicia"])));
        assert!(compare(Operator::EqualSensitive, "Alice", &values(&["Alice"])));
        assert!(!compare(Operator::EqualSensitive, "Alice", &values(&["alice"])));
    }

    #[test]
    fn test_in_uses_full_value_list() {
        let list = values(&["gb", "ie", "fr"]);
        assert!(compare(Operator::In, "fr", &list));
        assert!(!compare(Operator::In, "FR", &list));
        assert!(!compare(Operator::In, "de", &list));
    }

    #[test]
    fn test_gt_is_lexicographic() {
        assert!(compare(Operator::GreaterThan, "b", &values(&["a"])));
        assert!(!compare(Operator::GreaterThan, "a", &values(&["a"])));
        // "9" sorts after "10" as text
        assert!(compare(Operator::GreaterThan, "9", &values(&["10"])));
    }

    #[test]
    fn test_match_operator() {
        assert!(compare(Operator::Match, "user-1234", &values(&[r"\d{4}"])));
        assert!(compare(Operator::Match, "user-1234", &values(&["^user-"])));
        assert!(!compare(Operator::Match, "user-12", &values(&[r"\d{4}"])));
        // invalid pattern
        assert!(!compare(Operator::Match, "user-1234", &values(&["(unclosed"])));
    }

    #[test]
    fn test_empty_values_never_match() {
        assert!(!compare(Operator::In, "x", &[]));

        let evaluator = evaluator_with(vec![], vec![]);
        let target = Target::new("u1");
        assert!(!evaluator.evaluate_clause(&clause("identifier", Operator::Equal, &[]), &target));
    }

    #[test]
    fn test_missing_attribute_fails_closed() {
        let evaluator = evaluator_with(vec![], vec![]);
        let target = Target::new("u1");

        assert!(!evaluator.evaluate_clause(&clause("email", Operator::Contains, &[""]), &target));
    }

    #[test]
    fn test_unknown_operator_never_matches() {
        let evaluator = evaluator_with(vec![], vec![]);
        let target = Target::new("u1");

        assert!(!evaluator.evaluate_clause(&clause("identifier", Operator::Unknown, &["u1"]), &target));
    }

    #[test]
    fn test_typed_attributes_coerce_to_text() {
        let evaluator = evaluator_with(vec![], vec![]);
        let target = Target::new("u1")
            .with_attribute("age", 42)
            .with_attribute("beta", true)
            .anonymous(true);

        assert!(evaluator.evaluate_clause(&clause("age", Operator::EqualSensitive, &["42"]), &target));
        assert!(evaluator.evaluate_clause(&clause("beta", Operator::Equal, &["TRUE"]), &target));
        assert!(evaluator.evaluate_clause(&clause("Anonymous", Operator::In, &["true"]), &target));
    }

    #[test]
    fn test_segment_match_ignores_attribute() {
        let evaluator = evaluator_with(vec![], vec![Segment::new("beta").include("u1")]);

        assert!(evaluator.evaluate_clause(&Clause::segment_match(["beta"]), &Target::new("u1")));
        assert!(!evaluator.evaluate_clause(&Clause::segment_match(["beta"]), &Target::new("u2")));
    }

    #[test]
    fn test_clauses_are_a_conjunction() {
        let evaluator = evaluator_with(vec![], vec![]);
        let target = Target::new("u1").with_attribute("country", "ie");

        let both = [
            clause("identifier", Operator::Equal, &["u1"]),
            clause("country", Operator::In, &["ie", "gb"]),
        ];
        let one_fails = [
            clause("identifier", Operator::Equal, &["u1"]),
            clause("country", Operator::In, &["fr"]),
        ];

        assert!(evaluator.evaluate_clauses(&both, &target));
        assert!(!evaluator.evaluate_clauses(&one_fails, &target));
        assert!(evaluator.evaluate_clauses(&[], &target));
    }
}
