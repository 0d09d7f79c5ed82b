//! Weighted rule tables
//!
//! A composite gesture is a list of named boolean conditions, each worth a
//! fixed weight. The rule fires when the summed weight clears the
//! gesture's acceptance threshold. A condition added with
//! [`RuleTable::gate`] also vetoes acceptance on its own. Simple gestures
//! use the same table with [`RuleTable::all_passed`] instead.

use super::{DebugMap, DebugValue};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleCheck {
    pub name: &'static str,
    pub weight: f32,
    pub passed: bool,
    /// Failing this condition rejects the rule whatever the weight sum
    pub mandatory: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleTable {
    checks: Vec<RuleCheck>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition; chainable
    pub fn check(mut self, name: &'static str, weight: f32, passed: bool) -> Self {
        self.checks.push(RuleCheck {
            name,
            weight,
            passed,
            mandatory: false,
        });
        self
    }

    /// Weighted condition that must also pass for [`RuleTable::accepted`]
    pub fn gate(mut self, name: &'static str, weight: f32, passed: bool) -> Self {
        self.checks.push(RuleCheck {
            name,
            weight,
            passed,
            mandatory: true,
        });
        self
    }

    /// Add an unweighted condition (for boolean-AND rules)
    pub fn require(self, name: &'static str, passed: bool) -> Self {
        self.check(name, 0.0, passed)
    }

    /// Sum of the weights of passing conditions, clamped to [0, 1]
    pub fn confidence(&self) -> f32 {
        self.checks
            .iter()
            .filter(|c| c.passed)
            .map(|c| c.weight)
            .sum::<f32>()
            .clamp(0.0, 1.0)
    }

    /// Every gate passed and the weight sum is strictly greater than the
    /// acceptance threshold
    pub fn accepted(&self, threshold: f32) -> bool {
        self.checks.iter().all(|c| c.passed || !c.mandatory) && self.confidence() > threshold
    }

    pub fn all_passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    pub fn checks(&self) -> &[RuleCheck] {
        &self.checks
    }

    /// Copy every condition into `debug` as `<prefix>.<name>`
    pub fn record(&self, prefix: &str, debug: &mut DebugMap) {
        for c in &self.checks {
            debug.insert(format!("{prefix}.{}", c.name), DebugValue::Flag(c.passed));
        }
    }
}
