//! Rule-based marketing strategy for each segment profile
//!
//! Strategies come from an ordered rule table: the first rule whose condition
//! holds wins and the last rule always matches. Evaluation is pure, so the
//! decision chain can be checked without rendering anything.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::profile::{ProfileRow, SegmentProfile};

/// Column holding the spending metric in the reference mall dataset
pub const DEFAULT_SPENDING_COLUMN: &str = "Spending Score (1-100)";
/// Column holding the income metric in the reference mall dataset
pub const DEFAULT_INCOME_COLUMN: &str = "Annual Income (k$)";

/// Qualitative marketing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    HighValueChampions,
    BudgetConsciousSavers,
    EagerYoungShoppers,
    StandardCustomers,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::HighValueChampions => "High-Value Champions",
            Strategy::BudgetConsciousSavers => "Budget-Conscious Savers",
            Strategy::EagerYoungShoppers => "Eager Young Shoppers",
            Strategy::StandardCustomers => "Standard Customers",
        }
    }

    /// Short description of the customers in the segment
    pub fn profile(self) -> &'static str {
        match self {
            Strategy::HighValueChampions => "High income, high spenders.",
            Strategy::BudgetConsciousSavers => "Cautious spenders looking for value.",
            Strategy::EagerYoungShoppers => "Lower income but high desire to spend on trends.",
            Strategy::StandardCustomers => "Average income and spending.",
        }
    }

    /// Recommended marketing actions
    pub fn guidance(self) -> &'static str {
        match self {
            Strategy::HighValueChampions => {
                "Target with premium products, loyalty programs, and exclusive offers."
            }
            Strategy::BudgetConsciousSavers => {
                "Engage with discounts, bundle offers, and 'value for money' campaigns."
            }
            Strategy::EagerYoungShoppers => {
                "Use social media (Instagram), influencer marketing, and 'Buy Now, Pay Later' options."
            }
            Strategy::StandardCustomers => {
                "Nurture with email marketing, seasonal promotions, and a focus on customer service."
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule thresholds; the defaults are the historical campaign cut-offs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Champions spend more than this
    pub champion_spending: f64,
    /// Champions earn more than this
    pub champion_income: f64,
    /// Savers spend less than this
    pub saver_spending: f64,
    /// Savers earn less than this
    pub saver_income: f64,
    /// Eager shoppers spend more than this
    pub eager_spending: f64,
    /// Eager shoppers earn less than this
    pub eager_income: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            champion_spending: 65.0,
            champion_income: 65.0,
            saver_spending: 35.0,
            saver_income: 40.0,
            eager_spending: 60.0,
            eager_income: 40.0,
        }
    }
}

/// Names of the profile columns the rules read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricColumns {
    pub spending: String,
    pub income: String,
}

impl Default for MetricColumns {
    fn default() -> Self {
        Self {
            spending: DEFAULT_SPENDING_COLUMN.to_string(),
            income: DEFAULT_INCOME_COLUMN.to_string(),
        }
    }
}

/// Segment metrics the rules are evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub spending: f64,
    pub income: f64,
}

/// One entry of the decision chain
pub struct Rule {
    pub strategy: Strategy,
    pub condition: fn(&Metrics, &Thresholds) -> bool,
}

/// Decision chain in evaluation order
pub static RULES: [Rule; 4] = [
    Rule {
        strategy: Strategy::HighValueChampions,
        condition: |m, t| m.spending > t.champion_spending && m.income > t.champion_income,
    },
    Rule {
        strategy: Strategy::BudgetConsciousSavers,
        condition: |m, t| m.spending < t.saver_spending && m.income < t.saver_income,
    },
    Rule {
        strategy: Strategy::EagerYoungShoppers,
        condition: |m, t| m.spending > t.eager_spending && m.income < t.eager_income,
    },
    Rule {
        strategy: Strategy::StandardCustomers,
        condition: |_, _| true,
    },
];

/// Outcome of classifying one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    Strategy(Strategy),
    /// The profile lacks the spending or income metric
    InsufficientData,
}

impl Recommendation {
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            Recommendation::Strategy(strategy) => Some(strategy),
            Recommendation::InsufficientData => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Strategy(strategy) => strategy.label(),
            Recommendation::InsufficientData => "Insufficient data for strategy",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Segment id to recommendation, one entry per profiled segment
pub type StrategyAssignment = BTreeMap<usize, Recommendation>;

/// Pick the first matching rule for the given metrics
pub fn evaluate(metrics: &Metrics, thresholds: &Thresholds) -> Strategy {
    RULES
        .iter()
        .find(|rule| (rule.condition)(metrics, thresholds))
        .map_or(Strategy::StandardCustomers, |rule| rule.strategy)
}

/// Classify one profile row; rules are skipped when a metric is missing
pub fn classify(row: &ProfileRow, columns: &MetricColumns, thresholds: &Thresholds) -> Recommendation {
    match (row.get(&columns.spending), row.get(&columns.income)) {
        (Some(spending), Some(income)) => {
            Recommendation::Strategy(evaluate(&Metrics { spending, income }, thresholds))
        }
        _ => Recommendation::InsufficientData,
    }
}

/// Classify every segment of a profile
pub fn assign_strategies(
    profile: &SegmentProfile,
    columns: &MetricColumns,
    thresholds: &Thresholds,
) -> StrategyAssignment {
    profile
        .rows()
        .map(|(segment, row)| (segment, classify(row, columns, thresholds)))
        .collect()
}
