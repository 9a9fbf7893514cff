//! Strategy - ordered condition/action rules and the built-in presets

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while loading or validating a strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("malformed rule `{rule}`: {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("duplicate rule id `{0}`")]
    DuplicateRuleId(String),

    #[error("invalid strategy JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// RULE VOCABULARY
// ============================================================================

/// What a rule's predicate looks at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Always true
    Always,
    /// Value of the tile under the drone
    CurrentValue,
    /// Turns left in the mission
    TurnsRemaining,
    /// Highest value among revealed tiles
    HighestValue,
}

/// Integer comparison used by a predicate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    AtMost,
    AtLeast,
    Equal,
}

/// What a rule does when it is chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Mine the current tile
    MineCurrent,
    /// Step towards the sector heart, preferring rich tiles
    SeekFrontier,
    /// Step towards (or mine) the best revealed tile
    MoveHighestKnown,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Always,
        Condition::CurrentValue,
        Condition::TurnsRemaining,
        Condition::HighestValue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Always => "ALWAYS",
            Condition::CurrentValue => "CURRENT_VALUE",
            Condition::TurnsRemaining => "TURNS_REMAINING",
            Condition::HighestValue => "HIGHEST_VALUE",
        }
    }
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::AtMost => "<=",
            Operator::AtLeast => ">=",
            Operator::Equal => "=",
        }
    }

    /// Apply the comparison `lhs <op> rhs`
    pub fn compare(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Operator::AtMost => lhs <= rhs,
            Operator::AtLeast => lhs >= rhs,
            Operator::Equal => lhs == rhs,
        }
    }
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::MineCurrent => "MINE_CURRENT",
            Action::SeekFrontier => "SEEK_FRONTIER",
            Action::MoveHighestKnown => "MOVE_HIGHEST_KNOWN",
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown condition `{s}`"))
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(Operator::AtMost),
            ">=" => Ok(Operator::AtLeast),
            "=" => Ok(Operator::Equal),
            _ => Err(format!("unknown operator `{s}`")),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MINE_CURRENT" => Ok(Action::MineCurrent),
            "SEEK_FRONTIER" => Ok(Action::SeekFrontier),
            "MOVE_HIGHEST_KNOWN" => Ok(Action::MoveHighestKnown),
            _ => Err(format!("unknown action `{s}`")),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE
// ============================================================================

/// One condition -> action rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleSpec", into = "RuleSpec")]
pub struct Rule {
    pub id: String,
    pub condition: Condition,
    pub operator: Operator,
    pub threshold: i32,
    /// Compare the current value against the highest known value instead of
    /// `threshold` (only used by `CurrentValue`)
    pub compare_with_highest: bool,
    pub action: Action,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        condition: Condition,
        operator: Operator,
        threshold: i32,
        action: Action,
    ) -> Self {
        Self {
            id: id.into(),
            condition,
            operator,
            threshold,
            compare_with_highest: false,
            action,
        }
    }

    /// Unconditional rule
    pub fn always(id: impl Into<String>, action: Action) -> Self {
        Self::new(id, Condition::Always, Operator::AtLeast, 0, action)
    }

    /// Compare against the highest known value instead of the threshold
    pub fn comparing_highest(mut self) -> Self {
        self.compare_with_highest = true;
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.condition {
            Condition::Always => write!(f, "ALWAYS -> {}", self.action),
            Condition::CurrentValue if self.compare_with_highest => write!(
                f,
                "CURRENT_VALUE {} HIGHEST -> {}",
                self.operator, self.action
            ),
            _ => write!(
                f,
                "{} {} {} -> {}",
                self.condition, self.operator, self.threshold, self.action
            ),
        }
    }
}

/// Wire form of a rule, as stored on disk
///
/// Tokens stay strings here so a bad value can be reported against its rule id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub id: String,
    pub condition: String,
    pub operator: String,
    pub threshold: i32,
    pub action: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub compare_with_highest: bool,
}

impl TryFrom<RuleSpec> for Rule {
    type Error = StrategyError;

    fn try_from(wire: RuleSpec) -> Result<Self, Self::Error> {
        let malformed = |reason: String| StrategyError::MalformedRule {
            rule: wire.id.clone(),
            reason,
        };

        let condition = wire.condition.parse::<Condition>().map_err(malformed)?;
        let operator = wire.operator.parse::<Operator>().map_err(malformed)?;
        let action = wire.action.parse::<Action>().map_err(malformed)?;

        Ok(Rule {
            id: wire.id,
            condition,
            operator,
            threshold: wire.threshold,
            compare_with_highest: wire.compare_with_highest,
            action,
        })
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        RuleSpec {
            id: rule.id,
            condition: rule.condition.as_str().to_string(),
            operator: rule.operator.as_str().to_string(),
            threshold: rule.threshold,
            action: rule.action.as_str().to_string(),
            compare_with_highest: rule.compare_with_highest,
        }
    }
}

// ============================================================================
// STRATEGY
// ============================================================================

/// Ordered rule list; the first rule whose condition holds decides the turn
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strategy {
    rules: Vec<Rule>,
}

impl Strategy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Build from wire-form rules, rejecting unknown tokens and duplicate ids
    pub fn from_specs(specs: Vec<RuleSpec>) -> Result<Self, StrategyError> {
        let rules = specs
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let strategy = Self { rules };
        strategy.validate()?;
        Ok(strategy)
    }

    /// Parse a JSON rule array
    pub fn from_json(json: &str) -> Result<Self, StrategyError> {
        let specs: Vec<RuleSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    /// Check structural validity
    pub fn validate(&self) -> Result<(), StrategyError> {
        let mut seen = FxHashSet::default();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(StrategyError::DuplicateRuleId(rule.id.clone()));
            }
        }
        Ok(())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Wire-form copy of the rules
    pub fn to_specs(&self) -> Vec<RuleSpec> {
        self.rules.iter().cloned().map(RuleSpec::from).collect()
    }
}

impl FromIterator<Rule> for Strategy {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A strategy under a store key and display name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedStrategy {
    pub key: String,
    pub name: String,
    #[serde(rename = "rules")]
    pub strategy: Strategy,
}

impl NamedStrategy {
    pub fn new(key: impl Into<String>, name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            strategy,
        }
    }
}

// ============================================================================
// PRESETS
// ============================================================================

/// Static description of a built-in preset
#[derive(Clone, Copy, Debug)]
pub struct PresetInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Built-in presets in canonical order
pub const PRESETS: [PresetInfo; 4] = [
    PresetInfo {
        key: "recon",
        name: "Standard Recon",
        description: "Move towards the center for 3 turns, then exploit the best known tile.",
    },
    PresetInfo {
        key: "value_hunter",
        name: "Jackpot Hunter",
        description: "Search until finding a 40+ tile, then exploit. Uses center-seeking to prioritize heart of the sector.",
    },
    PresetInfo {
        key: "custom",
        name: "Custom",
        description: "Start from scratch. Build your own unique logic sequence here.",
    },
    PresetInfo {
        key: "homebody",
        name: "Homebody",
        description: "Moves exactly once on Turn 1 to the best nearby tile, then exploits to the end.",
    },
];

/// Look up a preset's static info
pub fn preset_info(key: &str) -> Option<&'static PresetInfo> {
    PRESETS.iter().find(|p| p.key == key)
}

/// Position of a key in the canonical preset order
pub fn preset_rank(key: &str) -> Option<usize> {
    PRESETS.iter().position(|p| p.key == key)
}

/// Build a built-in preset by key
pub fn preset(key: &str) -> Option<NamedStrategy> {
    let info = preset_info(key)?;
    let rules = match info.key {
        "recon" => vec![
            Rule::new("p1-1", Condition::TurnsRemaining, Operator::AtLeast, 17, Action::SeekFrontier),
            Rule::always("p1-2", Action::MoveHighestKnown),
        ],
        "value_hunter" => vec![
            Rule::new("p2-1", Condition::HighestValue, Operator::AtLeast, 40, Action::MoveHighestKnown),
            Rule::always("p2-2", Action::SeekFrontier),
        ],
        "homebody" => vec![
            Rule::new("p4-1", Condition::TurnsRemaining, Operator::Equal, 20, Action::MoveHighestKnown),
            Rule::always("p4-2", Action::MineCurrent),
        ],
        _ => Vec::new(),
    };
    Some(NamedStrategy::new(info.key, info.name, Strategy::new(rules)))
}

/// All built-in presets in canonical order
pub fn presets() -> Vec<NamedStrategy> {
    PRESETS.iter().filter_map(|p| preset(p.key)).collect()
}

/// Display name for a store key, falling back to the key itself
pub fn display_name(key: &str) -> String {
    preset_info(key)
        .map(|p| p.name.to_string())
        .unwrap_or_else(|| key.to_string())
}
