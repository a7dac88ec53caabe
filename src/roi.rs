//! ROI arithmetic over a single scenario and the sidebar parameters.
//!
//! Everything here is a pure function of its arguments: the scenario rows
//! loaded from the workbook are only read, and the outputs are recomputed for
//! every request instead of being stored.

use crate::model::ScenarioResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

pub const WAGE_RANGE: RangeInclusive<f64> = 10.0..=50.0;
pub const WAGE_STEP: f64 = 0.5;
pub const ORDERS_RANGE: RangeInclusive<u32> = 100..=2000;
pub const ORDERS_STEP: u32 = 50;
pub const WORKING_DAYS_RANGE: RangeInclusive<u32> = 200..=365;
pub const WORKING_DAYS_STEP: u32 = 5;

/// Sidebar parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiInputs {
    /// Hourly worker wage in dollars
    pub hourly_wage: f64,
    pub orders_per_day: u32,
    pub working_days_per_year: u32,
}

impl Default for RoiInputs {
    fn default() -> Self {
        RoiInputs {
            hourly_wage: 25.0,
            orders_per_day: 600,
            working_days_per_year: 300,
        }
    }
}

impl RoiInputs {
    pub fn new(hourly_wage: f64, orders_per_day: u32, working_days_per_year: u32) -> Self {
        RoiInputs {
            hourly_wage,
            orders_per_day,
            working_days_per_year,
        }
    }

    /// Pull every parameter back inside the range the sidebar offers
    pub fn clamped(self) -> Self {
        let hourly_wage = if self.hourly_wage.is_finite() {
            self.hourly_wage
                .clamp(*WAGE_RANGE.start(), *WAGE_RANGE.end())
        } else {
            RoiInputs::default().hourly_wage
        };
        RoiInputs {
            hourly_wage,
            orders_per_day: self
                .orders_per_day
                .clamp(*ORDERS_RANGE.start(), *ORDERS_RANGE.end()),
            working_days_per_year: self
                .working_days_per_year
                .clamp(*WORKING_DAYS_RANGE.start(), *WORKING_DAYS_RANGE.end()),
        }
    }

    pub fn annual_orders(&self) -> u64 {
        self.orders_per_day as u64 * self.working_days_per_year as u64
    }
}

/// Share of the current figure removed by the optimized one
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reduction {
    /// `(current - optimized) / current`
    Fraction(f64),
    /// The current figure is zero, so there is nothing to reduce
    NotApplicable,
}

impl Reduction {
    pub fn between(current: f64, optimized: f64) -> Self {
        if current == 0.0 || !current.is_finite() || !optimized.is_finite() {
            return Reduction::NotApplicable;
        }
        Reduction::Fraction((current - optimized) / current)
    }

    pub fn fraction(&self) -> Option<f64> {
        match self {
            Reduction::Fraction(f) => Some(*f),
            Reduction::NotApplicable => None,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        self.fraction().map(|f| f * 100.0)
    }

    /// Percentage with the given number of decimals, or `n/a`
    pub fn display_with(&self, decimals: usize) -> String {
        match self.percent() {
            Some(p) => format!("{:.*}%", decimals, p),
            None => "n/a".to_string(),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_with(1))
    }
}

/// Annual figures for one scenario under one set of inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiOutputs {
    pub scenario: String,
    pub annual_orders: u64,
    pub distance_saved_per_order: f64,
    pub time_saved_per_order_hours: f64,
    pub annual_distance_saved: f64,
    pub annual_time_saved_hours: f64,
    pub annual_cost_saved: f64,
    pub distance_reduction: Reduction,
    pub time_reduction: Reduction,
}

pub fn compute(scenario: &ScenarioResult, inputs: &RoiInputs) -> RoiOutputs {
    let annual_orders = inputs.annual_orders();
    let distance_saved_per_order = scenario.distance_saved();
    let time_saved_per_order_hours = scenario.time_saved();
    let annual_time_saved_hours = time_saved_per_order_hours * annual_orders as f64;

    RoiOutputs {
        scenario: scenario.name.clone(),
        annual_orders,
        distance_saved_per_order,
        time_saved_per_order_hours,
        annual_distance_saved: distance_saved_per_order * annual_orders as f64,
        annual_time_saved_hours,
        annual_cost_saved: annual_time_saved_hours * inputs.hourly_wage,
        distance_reduction: Reduction::between(
            scenario.distance_current,
            scenario.distance_optimized,
        ),
        time_reduction: Reduction::between(scenario.time_current, scenario.time_optimized),
    }
}

/// One row of the all-scenarios table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub scenario: String,
    pub distance_reduction: Reduction,
    pub time_reduction: Reduction,
    pub annual_cost_saved: f64,
    pub annual_time_saved_hours: f64,
    pub annual_distance_saved: f64,
}

impl From<RoiOutputs> for ScenarioComparison {
    fn from(out: RoiOutputs) -> Self {
        ScenarioComparison {
            scenario: out.scenario,
            distance_reduction: out.distance_reduction,
            time_reduction: out.time_reduction,
            annual_cost_saved: out.annual_cost_saved,
            annual_time_saved_hours: out.annual_time_saved_hours,
            annual_distance_saved: out.annual_distance_saved,
        }
    }
}

/// Evaluate every scenario with the same inputs, in workbook order
pub fn compare_all(scenarios: &[ScenarioResult], inputs: &RoiInputs) -> Vec<ScenarioComparison> {
    scenarios
        .iter()
        .map(|s| compute(s, inputs).into())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(dc: f64, d_opt: f64, tc: f64, t_opt: f64) -> ScenarioResult {
        ScenarioResult {
            name: "Loadform 1".to_string(),
            distance_current: dc,
            distance_optimized: d_opt,
            time_current: tc,
            time_optimized: t_opt,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn annual_figures_follow_the_formulas() {
        let s = scenario(1000.0, 600.0, 2.5, 1.5);
        let out = compute(&s, &RoiInputs::new(20.0, 500, 250));

        assert_eq!(out.annual_orders, 125_000);
        assert!(close(out.distance_saved_per_order, 400.0));
        assert!(close(out.annual_distance_saved, 50_000_000.0));
        assert!(close(out.annual_time_saved_hours, 125_000.0));
        assert!(close(out.annual_cost_saved, 2_500_000.0));
        assert_eq!(out.distance_reduction, Reduction::Fraction(0.4));
        assert_eq!(out.time_reduction, Reduction::Fraction(0.4));
    }

    #[test]
    fn reduction_is_within_unit_interval_when_optimized_is_lower() {
        for (current, optimized) in [(10.0, 0.0), (10.0, 9.999), (812.4, 533.1), (1e9, 1.0)] {
            let f = Reduction::between(current, optimized).fraction().unwrap();
            assert!(f > 0.0 && f <= 1.0, "{} -> {} gave {}", current, optimized, f);
        }
    }

    #[test]
    fn zero_current_is_not_applicable() {
        let out = compute(&scenario(0.0, 0.0, 0.0, 0.0), &RoiInputs::default());
        assert_eq!(out.distance_reduction, Reduction::NotApplicable);
        assert_eq!(out.time_reduction, Reduction::NotApplicable);
        assert_eq!(out.distance_reduction.to_string(), "n/a");
        assert_eq!(out.annual_cost_saved, 0.0);
    }

    #[test]
    fn cost_scales_linearly_with_wage_and_orders() {
        let s = scenario(900.0, 500.0, 2.0, 1.25);
        let base = compute(&s, &RoiInputs::new(15.0, 300, 250)).annual_cost_saved;

        let double_wage = compute(&s, &RoiInputs::new(30.0, 300, 250)).annual_cost_saved;
        assert!(close(double_wage, 2.0 * base));

        let triple_orders = compute(&s, &RoiInputs::new(15.0, 900, 250)).annual_cost_saved;
        assert!(close(triple_orders, 3.0 * base));
    }

    #[test]
    fn inputs_are_clamped_to_sidebar_bounds() {
        let clamped = RoiInputs::new(80.0, 5, 400).clamped();
        assert_eq!(clamped, RoiInputs::new(50.0, 100, 365));

        let nan_wage = RoiInputs::new(f64::NAN, 600, 300).clamped();
        assert_eq!(nan_wage.hourly_wage, 25.0);

        let inside = RoiInputs::new(12.5, 750, 260);
        assert_eq!(inside.clamped(), inside);
    }

    #[test]
    fn compare_all_keeps_workbook_order() {
        let mut a = scenario(100.0, 50.0, 1.0, 0.5);
        a.name = "Loadform 1".to_string();
        let mut b = scenario(100.0, 90.0, 1.0, 0.9);
        b.name = "Loadform 2".to_string();

        let rows = compare_all(&[a, b], &RoiInputs::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].scenario, "Loadform 1");
        assert_eq!(rows[1].scenario, "Loadform 2");
        assert!(rows[0].annual_cost_saved > rows[1].annual_cost_saved);
    }

    #[test]
    fn reduction_formats_as_percent() {
        assert_eq!(Reduction::Fraction(0.3456).display_with(2), "34.56%");
        assert_eq!(Reduction::Fraction(0.3456).to_string(), "34.6%");
    }
}
