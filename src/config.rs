// Analysis settings: anomaly cut-offs, the optional PG floor rule, and the
// category sets used by the breakdowns.
use crate::error::{DashboardError, Result};
use crate::types::BookingRecord;
use crate::util::sum_counts;

/// A named breakdown category and the counter it sums.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub accessor: fn(&BookingRecord) -> i64,
}

impl Category {
    pub fn new(name: &str, accessor: fn(&BookingRecord) -> i64) -> Self {
        Category {
            name: name.to_string(),
            accessor,
        }
    }

    pub fn total(&self, records: &[BookingRecord]) -> i64 {
        sum_counts(records.iter().map(self.accessor))
    }
}

/// The fixed category dimensions. New categories are added here, not in the
/// aggregator.
#[derive(Debug, Clone)]
pub struct CategorySet {
    pub channels: Vec<Category>,
    pub tickets: Vec<Category>,
    pub cities: Vec<Category>,
}

impl Default for CategorySet {
    fn default() -> Self {
        CategorySet {
            channels: vec![
                Category::new("Website", |r| r.website_booking),
                Category::new("App", |r| r.app_booking),
                Category::new("Agents", |r| r.agents_booking),
                Category::new("SwaRail", |r| r.swa_rail_app_booking),
            ],
            tickets: vec![
                Category::new("I-Tickets", |r| r.i_tkts),
                Category::new("E-Tickets", |r| r.e_tkts),
                Category::new("Tatkal", |r| r.tatkal),
            ],
            cities: vec![
                Category::new("Delhi", |r| r.delhi),
                Category::new("Chennai", |r| r.chennai),
                Category::new("Kolkata", |r| r.kolkata),
                Category::new("Mumbai", |r| r.mumbai),
            ],
        }
    }
}

/// Absolute floor for `pgSuccessRate`, applied on top of the z-score scan.
///
/// Values below `critical` are high severity, values below `floor` medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PgFloorRule {
    pub floor: f64,
    pub critical: f64,
}

impl Default for PgFloorRule {
    fn default() -> Self {
        PgFloorRule {
            floor: 30.0,
            critical: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// A value is anomalous when its z-score is strictly above this.
    pub z_trigger: f64,
    pub z_medium: f64,
    pub z_high: f64,
    pub pg_floor: Option<PgFloorRule>,
    pub categories: CategorySet,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            z_trigger: 2.0,
            z_medium: 2.5,
            z_high: 3.0,
            pg_floor: None,
            categories: CategorySet::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_pg_floor(mut self, rule: PgFloorRule) -> Self {
        self.pg_floor = Some(rule);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let cuts = [self.z_trigger, self.z_medium, self.z_high];
        if cuts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(DashboardError::Config(
                "z-score cut-offs must be finite and non-negative".to_string(),
            ));
        }
        if !(self.z_trigger < self.z_medium && self.z_medium < self.z_high) {
            return Err(DashboardError::Config(format!(
                "z-score cut-offs must increase: trigger {} < medium {} < high {}",
                self.z_trigger, self.z_medium, self.z_high
            )));
        }
        if let Some(rule) = &self.pg_floor {
            if !rule.floor.is_finite() || !rule.critical.is_finite() || rule.critical > rule.floor {
                return Err(DashboardError::Config(format!(
                    "PG floor {} must be finite and not below critical level {}",
                    rule.floor, rule.critical
                )));
            }
        }
        let c = &self.categories;
        if c.channels.is_empty() || c.tickets.is_empty() || c.cities.is_empty() {
            return Err(DashboardError::Config(
                "every category set needs at least one category".to_string(),
            ));
        }
        Ok(())
    }
}
