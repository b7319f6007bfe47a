//! Long-lived financial plans: allocations, actuals and savings projections.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interest::{InterestType, MONTHLY};
use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::calendar::checked_shift_month;
use crate::ledger::DateRange;
use crate::taxonomy::{CategoryId, Taxonomy};
use crate::utils::{clamped_ratio, safe_ratio};

/// Projection points reserved up front; longer horizons grow on demand.
const PREALLOCATED_MONTHS: u32 = 1200;

/// Budget plan for a date range. Missing map keys read as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialPlan {
    pub id: Uuid,
    pub name: String,
    pub period: DateRange,
    pub currency: String,
    pub total_income: f64,
    pub total_budget: f64,
    pub savings_goal: f64,
    pub emergency_fund_goal: f64,
    pub interest_type: InterestType,
    /// Annual rate as a fraction (0.05 = 5%).
    pub annual_rate: f64,
    compounding_frequency: i64,
    #[serde(default)]
    pub category_allocations: BTreeMap<CategoryId, f64>,
    #[serde(default)]
    pub category_actuals: BTreeMap<CategoryId, f64>,
    /// Monthly income by source name.
    #[serde(default)]
    pub monthly_income: BTreeMap<String, f64>,
    #[serde(default)]
    pub fixed_expenses: BTreeMap<CategoryId, f64>,
    /// Monthly contribution by savings target name.
    #[serde(default)]
    pub savings_contributions: BTreeMap<String, f64>,
}

/// Planned versus actual spending for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryVariance {
    pub category_id: CategoryId,
    pub allocated: f64,
    pub actual: f64,
    /// `actual - allocated`; positive means overspent.
    pub variance: f64,
    /// `actual / allocated`, zero when nothing was allocated.
    pub utilization: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub savings: f64,
    pub emergency_fund: f64,
}

/// Balance at the end of one projected month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub month: u32,
    pub date: NaiveDate,
    pub contributed: f64,
    pub interest_earned: f64,
    pub balance: f64,
}

impl FinancialPlan {
    pub fn new(name: impl Into<String>, period: DateRange, currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            period,
            currency: currency.into(),
            total_income: 0.0,
            total_budget: 0.0,
            savings_goal: 0.0,
            emergency_fund_goal: 0.0,
            interest_type: InterestType::default(),
            annual_rate: 0.0,
            compounding_frequency: MONTHLY,
            category_allocations: BTreeMap::new(),
            category_actuals: BTreeMap::new(),
            monthly_income: BTreeMap::new(),
            fixed_expenses: BTreeMap::new(),
            savings_contributions: BTreeMap::new(),
        }
    }

    /// Sets the interest model, rejecting a compounding frequency below 1.
    pub fn with_interest(
        mut self,
        interest_type: InterestType,
        annual_rate: f64,
        compounding_frequency: i64,
    ) -> LedgerResult<Self> {
        if compounding_frequency < 1 {
            return Err(LedgerError::InvalidCompoundingFrequency(
                compounding_frequency,
            ));
        }
        self.interest_type = interest_type;
        self.annual_rate = annual_rate;
        self.compounding_frequency = compounding_frequency;
        Ok(self)
    }

    pub fn compounding_frequency(&self) -> i64 {
        self.compounding_frequency
    }

    pub fn set_allocation(&mut self, category_id: CategoryId, amount: f64) {
        self.category_allocations.insert(category_id, amount);
    }

    /// Adds `amount` to the category's actual spend.
    pub fn record_actual(&mut self, category_id: CategoryId, amount: f64) {
        *self.category_actuals.entry(category_id).or_insert(0.0) += amount;
    }

    pub fn set_actual(&mut self, category_id: CategoryId, amount: f64) {
        self.category_actuals.insert(category_id, amount);
    }

    /// Replaces allocations with each active category's share of `total_budget`.
    pub fn allocate_from_percentages(&mut self, taxonomy: &Taxonomy) {
        self.category_allocations = taxonomy
            .active_categories()
            .into_iter()
            .map(|category| {
                let amount = self.total_budget * category.budget_allocation_percent / 100.0;
                (category.id, amount)
            })
            .collect();
        tracing::debug!(
            plan = %self.id,
            categories = self.category_allocations.len(),
            "allocated budget from category percentages"
        );
    }

    pub fn allocation(&self, category_id: CategoryId) -> f64 {
        self.category_allocations
            .get(&category_id)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn actual(&self, category_id: CategoryId) -> f64 {
        self.category_actuals
            .get(&category_id)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn variance(&self, category_id: CategoryId) -> f64 {
        self.actual(category_id) - self.allocation(category_id)
    }

    /// Variance for every category that has an allocation or an actual.
    pub fn variances(&self) -> Vec<CategoryVariance> {
        let categories: BTreeSet<CategoryId> = self
            .category_allocations
            .keys()
            .chain(self.category_actuals.keys())
            .copied()
            .collect();
        categories
            .into_iter()
            .map(|category_id| {
                let allocated = self.allocation(category_id);
                let actual = self.actual(category_id);
                CategoryVariance {
                    category_id,
                    allocated,
                    actual,
                    variance: actual - allocated,
                    utilization: safe_ratio(actual, allocated),
                }
            })
            .collect()
    }

    pub fn total_allocated(&self) -> f64 {
        self.category_allocations.values().sum()
    }

    pub fn total_actual(&self) -> f64 {
        self.category_actuals.values().sum()
    }

    /// Budget not yet assigned to any category; negative when over-allocated.
    pub fn unallocated(&self) -> f64 {
        self.total_budget - self.total_allocated()
    }

    pub fn monthly_income_total(&self) -> f64 {
        self.monthly_income.values().sum()
    }

    pub fn fixed_expense_total(&self) -> f64 {
        self.fixed_expenses.values().sum()
    }

    pub fn monthly_contribution(&self) -> f64 {
        self.savings_contributions.values().sum()
    }

    /// Income left after actual spending, floored at zero.
    pub fn actual_savings(&self) -> f64 {
        (self.total_income - self.total_actual()).max(0.0)
    }

    /// `actual / goal` clamped to `[0, 1]`; zero when the goal is not positive.
    pub fn progress_toward(goal: f64, actual: f64) -> f64 {
        if goal <= 0.0 {
            return 0.0;
        }
        clamped_ratio(actual, goal)
    }

    /// Progress of [`FinancialPlan::actual_savings`] toward both goals.
    pub fn goal_progress(&self) -> GoalProgress {
        let saved = self.actual_savings();
        GoalProgress {
            savings: Self::progress_toward(self.savings_goal, saved),
            emergency_fund: Self::progress_toward(self.emergency_fund_goal, saved),
        }
    }

    /// `principal` grown for `years` under the plan's interest model.
    pub fn projected_balance(&self, principal: f64, years: f64) -> LedgerResult<f64> {
        self.interest_type.calculate_amount(
            principal,
            self.annual_rate,
            years,
            self.compounding_frequency,
        )
    }

    pub fn projected_interest(&self, principal: f64, years: f64) -> LedgerResult<f64> {
        self.interest_type.calculate_interest(
            principal,
            self.annual_rate,
            years,
            self.compounding_frequency,
        )
    }

    /// Month-by-month balance starting from `opening_balance`.
    ///
    /// Each month accrues interest on the balance held during the month, then
    /// adds [`FinancialPlan::monthly_contribution`]. Simple interest only ever
    /// accrues on deposited principal.
    pub fn monthly_projection(
        &self,
        opening_balance: f64,
        months: u32,
    ) -> LedgerResult<Vec<ProjectionPoint>> {
        let contribution = self.monthly_contribution();
        let month_fraction = 1.0 / 12.0;
        let mut principal = opening_balance;
        let mut interest_total = 0.0;
        let mut balance = opening_balance;
        let mut points = Vec::with_capacity(months.min(PREALLOCATED_MONTHS) as usize);

        for month in 1..=months {
            let interest = match self.interest_type {
                InterestType::Simple => self.interest_type.calculate_interest(
                    principal,
                    self.annual_rate,
                    month_fraction,
                    self.compounding_frequency,
                )?,
                InterestType::Compound => self.interest_type.calculate_interest(
                    balance,
                    self.annual_rate,
                    month_fraction,
                    self.compounding_frequency,
                )?,
            };
            interest_total += interest;
            principal += contribution;
            balance = principal + interest_total;
            points.push(ProjectionPoint {
                month,
                date: i32::try_from(month)
                    .ok()
                    .and_then(|offset| checked_shift_month(self.period.start, offset))
                    .unwrap_or(NaiveDate::MAX),
                contributed: principal - opening_balance,
                interest_earned: interest_total,
                balance,
            });
        }
        Ok(points)
    }

    /// First projected month whose balance reaches `goal`, searching up to `max_months`.
    pub fn months_to_goal(
        &self,
        opening_balance: f64,
        goal: f64,
        max_months: u32,
    ) -> LedgerResult<Option<u32>> {
        if opening_balance >= goal {
            return Ok(Some(0));
        }
        Ok(self
            .monthly_projection(opening_balance, max_months)?
            .into_iter()
            .find(|point| point.balance >= goal)
            .map(|point| point.month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::interest::ANNUALLY;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn plan() -> FinancialPlan {
        let period = DateRange::new(d(2025, 1, 1), d(2025, 12, 31)).unwrap();
        FinancialPlan::new("2025", period, "USD")
    }

    #[test]
    fn zero_compounding_frequency_is_rejected() {
        let err = plan()
            .with_interest(InterestType::Compound, 0.05, 0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCompoundingFrequency(0)));
    }

    #[test]
    fn variance_covers_allocated_and_unallocated_categories() {
        let mut plan = plan();
        plan.total_budget = 1000.0;
        plan.set_allocation(CategoryId::Food, 400.0);
        plan.record_actual(CategoryId::Food, 250.0);
        plan.record_actual(CategoryId::Food, 200.0);
        plan.record_actual(CategoryId::Shopping, 80.0);

        assert_eq!(plan.variance(CategoryId::Food), 50.0);
        assert_eq!(plan.variance(CategoryId::Transport), 0.0);
        assert_eq!(plan.unallocated(), 600.0);

        let variances = plan.variances();
        assert_eq!(variances.len(), 2);
        let shopping = variances
            .iter()
            .find(|v| v.category_id == CategoryId::Shopping)
            .unwrap();
        assert_eq!(shopping.allocated, 0.0);
        assert_eq!(shopping.utilization, 0.0);
    }

    #[test]
    fn percentage_allocation_uses_full_budget() {
        let mut plan = plan();
        plan.total_budget = 2000.0;
        plan.allocate_from_percentages(Taxonomy::standard());
        assert!((plan.total_allocated() - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn goal_progress_is_clamped() {
        let mut plan = plan();
        plan.total_income = 3000.0;
        plan.savings_goal = 500.0;
        plan.emergency_fund_goal = 0.0;
        plan.set_actual(CategoryId::Housing, 2000.0);
        let progress = plan.goal_progress();
        assert_eq!(progress.savings, 1.0);
        assert_eq!(progress.emergency_fund, 0.0);
        assert_eq!(FinancialPlan::progress_toward(1000.0, 250.0), 0.25);
    }

    #[test]
    fn monthly_projection_without_interest_accumulates_contributions() {
        let mut plan = plan();
        plan.savings_contributions.insert("emergency".into(), 100.0);
        plan.savings_contributions.insert("holiday".into(), 50.0);
        let points = plan.monthly_projection(1000.0, 12).unwrap();
        assert_eq!(points.len(), 12);
        assert_eq!(points[11].balance, 2800.0);
        assert_eq!(points[11].interest_earned, 0.0);
        assert_eq!(points[0].date, d(2025, 2, 1));
        assert_eq!(plan.months_to_goal(1000.0, 1450.0, 24).unwrap(), Some(3));
        assert_eq!(plan.months_to_goal(1000.0, 900.0, 24).unwrap(), Some(0));
    }

    #[test]
    fn projection_dates_saturate_at_calendar_end() {
        let period = DateRange::new(d(262_142, 1, 1), d(262_142, 6, 30)).unwrap();
        let plan = FinancialPlan::new("far", period, "USD");
        let points = plan.monthly_projection(0.0, 24).unwrap();
        assert_eq!(points.len(), 24);
        assert!(points.windows(2).all(|pair| pair[0].date <= pair[1].date));
        assert_eq!(points[23].date, NaiveDate::MAX);
    }

    #[test]
    fn compound_projection_earns_more_than_simple() {
        let compound = plan()
            .with_interest(InterestType::Compound, 0.06, MONTHLY)
            .unwrap();
        let simple = plan()
            .with_interest(InterestType::Simple, 0.06, ANNUALLY)
            .unwrap();
        let compound_end = compound.monthly_projection(10_000.0, 24).unwrap()[23].balance;
        let simple_end = simple.monthly_projection(10_000.0, 24).unwrap()[23].balance;
        assert!((simple_end - 11_200.0).abs() < 1e-6);
        assert!(compound_end > simple_end);
        let direct = compound.projected_balance(10_000.0, 2.0).unwrap();
        assert!((compound_end - direct).abs() < 1e-6);
    }
}
