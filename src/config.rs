//! Planner and optimizer switches.

pub const DEFAULT_MAX_RULE_PASSES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub predicate_pushdown: bool,
    pub projection_pushdown: bool,
    pub join_reorder: bool,
    /// Cap on the repeat-until-fixed-point loop of a single rule.
    pub max_rule_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            predicate_pushdown: true,
            projection_pushdown: true,
            join_reorder: true,
            max_rule_passes: DEFAULT_MAX_RULE_PASSES,
        }
    }
}

impl OptimizerConfig {
    pub fn disabled() -> Self {
        Self {
            predicate_pushdown: false,
            projection_pushdown: false,
            join_reorder: false,
            ..Self::default()
        }
    }

    /// Enables only the named rules. Unknown names are returned as the error.
    pub fn only(rules: &[&str]) -> Result<Self, String> {
        let mut config = Self::disabled();
        for rule in rules {
            match rule.trim() {
                "predicate_pushdown" => config.predicate_pushdown = true,
                "projection_pushdown" => config.projection_pushdown = true,
                "join_reorder" => config.join_reorder = true,
                "" => {}
                other => return Err(other.to_string()),
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    pub optimizer: OptimizerConfig,
}
