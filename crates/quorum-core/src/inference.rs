//! # Inference Module
//!
//! Forward-chaining rules over the store.
//!
//! A rule is a list of premises and one conclusion, written as
//!
//! ```text
//! ?x isa person ; ?x likes ?y => ?y isa treat
//! ```
//!
//! Tokens starting with `?` are variables, `*` matches anything without
//! binding, every other token is a literal. Premises are matched against
//! base clauses (qualifiers are ignored) and joined on shared variables.
//! Each complete binding instantiates the conclusion once.
//!
//! Rules only read the store. Asserting what they produce is the caller's
//! job, which keeps one call to `inferences` to exactly one pass.

use crate::ingestor::Ingestor;
use crate::pattern::{Pattern, Token};
use crate::primitives::{MAX_RULE_PREMISES, PREMISE_SEPARATOR, RULE_ARROW, VARIABLE_PREFIX};
use crate::store::ChainedStore;
use crate::{Clause, ExtendedClause, Field, QuorumError};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Produces inferred facts from the current store.
pub trait InferencePatterns {
    /// Record a new rule.
    fn teach(&mut self, rule: Rule);

    /// Every fact derivable in one pass over `store` under all known rules.
    ///
    /// The sequence is finite and may contain facts already in the store.
    fn inferences<'a>(
        &'a self,
        store: &'a ChainedStore,
    ) -> Box<dyn Iterator<Item = ExtendedClause> + 'a>;
}

// =============================================================================
// TERMS
// =============================================================================

/// One position of a rule clause.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Var(String),
    Value(Token),
}

impl Term {
    fn parse(raw: &str) -> Result<Self, QuorumError> {
        match raw.strip_prefix(VARIABLE_PREFIX) {
            Some("") => Err(QuorumError::InvalidRule(format!(
                "variable '{}' has no name",
                raw
            ))),
            Some(name) => Ok(Self::Var(name.to_string())),
            None => Ok(Self::Value(Token::new(raw))),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{}{}", VARIABLE_PREFIX, name),
            Self::Value(token) => write!(f, "{}", token),
        }
    }
}

type Binding = BTreeMap<String, String>;

/// Three terms in clause order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleClause {
    terms: [Term; 3],
}

impl RuleClause {
    fn parse(text: &str) -> Result<Self, QuorumError> {
        let clause: Clause = text.parse()?;
        Ok(Self {
            terms: [
                Term::parse(&clause.name)?,
                Term::parse(&clause.relation)?,
                Term::parse(&clause.node)?,
            ],
        })
    }

    fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().filter_map(|term| match term {
            Term::Var(name) => Some(name.as_str()),
            Term::Value(_) => None,
        })
    }

    /// The lookup pattern under `binding`: bound variables become literals,
    /// unbound ones wildcards.
    fn pattern(&self, binding: &Binding) -> Pattern {
        let token = |term: &Term| match term {
            Term::Var(name) => binding
                .get(name)
                .map(|value| Token::Literal(value.clone()))
                .unwrap_or(Token::Any),
            Term::Value(token) => token.clone(),
        };
        let [a, b, c] = &self.terms;
        Pattern::new(token(a), token(b), token(c))
    }

    /// Extend `binding` so that this rule clause equals `clause`.
    fn unify(&self, clause: &Clause, binding: &Binding) -> Option<Binding> {
        let mut extended = binding.clone();
        for field in Field::ALL {
            let value = clause.field(field);
            match &self.terms[field.position()] {
                Term::Value(token) => {
                    if !token.matches(value) {
                        return None;
                    }
                }
                Term::Var(name) => match extended.get(name) {
                    Some(bound) if bound != value => return None,
                    Some(_) => {}
                    None => {
                        extended.insert(name.clone(), value.to_string());
                    }
                },
            }
        }
        Some(extended)
    }

    fn instantiate(&self, binding: &Binding) -> Option<Clause> {
        let value = |term: &Term| match term {
            Term::Var(name) => binding.get(name).cloned(),
            Term::Value(token) => token.literal().map(str::to_string),
        };
        let [a, b, c] = &self.terms;
        Some(Clause::new(value(a)?, value(b)?, value(c)?))
    }
}

impl fmt::Display for RuleClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = &self.terms;
        write!(f, "{} {} {}", a, b, c)
    }
}

// =============================================================================
// RULE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rule {
    premises: Vec<RuleClause>,
    conclusion: RuleClause,
}

impl Rule {
    #[must_use]
    pub fn premise_count(&self) -> usize {
        self.premises.len()
    }

    /// Every conclusion this rule yields against `store`, in binding order.
    #[must_use]
    pub fn apply(&self, store: &ChainedStore) -> Vec<ExtendedClause> {
        let mut bindings = vec![Binding::new()];

        for premise in &self.premises {
            let mut next = Vec::new();
            for binding in &bindings {
                let hits = store.matching(&premise.pattern(binding));
                for (_, ec) in store.resolve(&hits) {
                    if let Some(extended) = premise.unify(&ec.clause, binding) {
                        next.push(extended);
                    }
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            bindings = next;
        }

        let mut seen = BTreeSet::new();
        bindings
            .iter()
            .filter_map(|binding| self.conclusion.instantiate(binding))
            .filter(|clause| seen.insert(clause.clone()))
            .map(ExtendedClause::new)
            .collect()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let premises: Vec<String> = self.premises.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{} {} {}",
            premises.join(&format!(" {} ", PREMISE_SEPARATOR)),
            RULE_ARROW,
            self.conclusion
        )
    }
}

impl FromStr for Rule {
    type Err = QuorumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lhs, rhs) = s.split_once(RULE_ARROW).ok_or_else(|| {
            QuorumError::InvalidRule(format!("'{}' is missing '{}'", s.trim(), RULE_ARROW))
        })?;
        if rhs.contains(RULE_ARROW) {
            return Err(QuorumError::InvalidRule(format!(
                "'{}' has more than one '{}'",
                s.trim(),
                RULE_ARROW
            )));
        }

        let premises = lhs
            .split(PREMISE_SEPARATOR)
            .map(RuleClause::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if premises.len() > MAX_RULE_PREMISES {
            return Err(QuorumError::InvalidRule(format!(
                "{} premises exceed maximum {}",
                premises.len(),
                MAX_RULE_PREMISES
            )));
        }

        let conclusion = RuleClause::parse(rhs)?;

        let bound: BTreeSet<&str> = premises.iter().flat_map(|p| p.variables()).collect();
        if let Some(unbound) = conclusion.variables().find(|v| !bound.contains(v)) {
            return Err(QuorumError::UnboundVariable(format!(
                "{}{}",
                VARIABLE_PREFIX, unbound
            )));
        }
        if conclusion
            .terms
            .iter()
            .any(|term| *term == Term::Value(Token::Any))
        {
            return Err(QuorumError::InvalidRule(
                "a conclusion cannot contain the wildcard".to_string(),
            ));
        }
        for term in &conclusion.terms {
            if let Term::Value(Token::Literal(lit)) = term {
                Ingestor::validate_field("conclusion literal", lit)
                    .map_err(|e| QuorumError::InvalidRule(e.to_string()))?;
            }
        }

        Ok(Self {
            premises,
            conclusion,
        })
    }
}

// =============================================================================
// PATTERN LIBRARY
// =============================================================================

/// Default `InferencePatterns`: rules applied in the order they were taught.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    rules: Vec<Rule>,
}

impl PatternLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.rules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl InferencePatterns for PatternLibrary {
    fn teach(&mut self, rule: Rule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    fn inferences<'a>(
        &'a self,
        store: &'a ChainedStore,
    ) -> Box<dyn Iterator<Item = ExtendedClause> + 'a> {
        Box::new(self.rules.iter().flat_map(move |rule| rule.apply(store)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
