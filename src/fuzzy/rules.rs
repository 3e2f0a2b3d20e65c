//! The fixed nine-rule knowledge base.
//!
//! | pos \ neg | Low      | Medium   | High     |
//! |-----------|----------|----------|----------|
//! | Low       | Neutral  | Negative | Negative |
//! | Medium    | Positive | Neutral  | Negative |
//! | High      | Positive | Positive | Neutral  |
//!
//! Equal signal strength on both axes cancels out to Neutral; otherwise the
//! dominant axis decides.

use std::fmt;

use super::variable::{InputTerm, LinguisticTerm, OutputTerm};

/// Consequent per (positive term, negative term), indexed by [`InputTerm`]
pub const RULE_TABLE: [[OutputTerm; 3]; 3] = [
    // positive = Low
    [OutputTerm::Neutral, OutputTerm::Negative, OutputTerm::Negative],
    // positive = Medium
    [OutputTerm::Positive, OutputTerm::Neutral, OutputTerm::Negative],
    // positive = High
    [OutputTerm::Positive, OutputTerm::Positive, OutputTerm::Neutral],
];

/// IF positive IS `positive` AND negative IS `negative` THEN sentiment IS `consequent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    pub positive: InputTerm,
    pub negative: InputTerm,
    pub consequent: OutputTerm,
}

impl Rule {
    /// The rule for one antecedent combination
    pub const fn lookup(positive: InputTerm, negative: InputTerm) -> Rule {
        Rule {
            positive,
            negative,
            consequent: RULE_TABLE[positive as usize][negative as usize],
        }
    }

    /// All nine rules, row-major over the table
    pub fn all() -> impl Iterator<Item = Rule> {
        InputTerm::ALL
            .into_iter()
            .flat_map(|p| InputTerm::ALL.into_iter().map(move |n| Rule::lookup(p, n)))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IF positive IS {} AND negative IS {} THEN sentiment IS {}",
            self.positive.name(),
            self.negative.name(),
            self.consequent.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nine_rules() {
        let rules: Vec<Rule> = Rule::all().collect();
        assert_eq!(rules.len(), 9);
        assert_eq!(rules[0], Rule::lookup(InputTerm::Low, InputTerm::Low));
        assert_eq!(rules[8], Rule::lookup(InputTerm::High, InputTerm::High));
    }

    #[test]
    fn test_diagonal_is_neutral() {
        for t in InputTerm::ALL {
            assert_eq!(Rule::lookup(t, t).consequent, OutputTerm::Neutral);
        }
    }

    #[test]
    fn test_dominant_axis_wins() {
        assert_eq!(Rule::lookup(InputTerm::High, InputTerm::Low).consequent, OutputTerm::Positive);
        assert_eq!(Rule::lookup(InputTerm::Medium, InputTerm::Low).consequent, OutputTerm::Positive);
        assert_eq!(Rule::lookup(InputTerm::High, InputTerm::Medium).consequent, OutputTerm::Positive);
        assert_eq!(Rule::lookup(InputTerm::Low, InputTerm::High).consequent, OutputTerm::Negative);
        assert_eq!(Rule::lookup(InputTerm::Low, InputTerm::Medium).consequent, OutputTerm::Negative);
        assert_eq!(Rule::lookup(InputTerm::Medium, InputTerm::High).consequent, OutputTerm::Negative);
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::lookup(InputTerm::High, InputTerm::Low);
        assert_eq!(
            rule.to_string(),
            "IF positive IS high AND negative IS low THEN sentiment IS positive"
        );
    }
}
