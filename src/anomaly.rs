// Z-score anomaly scan over the per-minute series.
//
// Each metric is scanned independently against its own population mean and
// standard deviation, so one minute can appear once per metric.
use crate::config::{AnalysisConfig, PgFloorRule};
use crate::types::{AnomalyMetric, AnomalyRecord, BookingRecord, Severity};
use crate::util::{average, population_std_dev};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricStats {
    pub fn from_values(values: &[f64]) -> Self {
        let mean = average(values);
        MetricStats {
            mean,
            std_dev: population_std_dev(values, mean),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.std_dev <= 0.0 || !self.std_dev.is_finite()
    }

    /// `None` when the series is flat: no value can stand out from it.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.is_flat() {
            return None;
        }
        Some((value - self.mean).abs() / self.std_dev)
    }

    pub fn threshold(&self, z_trigger: f64) -> f64 {
        self.mean + z_trigger * self.std_dev
    }
}

/// Map a z-score onto the severity ladder, or `None` below the trigger.
pub fn classify(z: f64, config: &AnalysisConfig) -> Option<Severity> {
    if z > config.z_high {
        Some(Severity::High)
    } else if z > config.z_medium {
        Some(Severity::Medium)
    } else if z > config.z_trigger {
        Some(Severity::Low)
    } else {
        None
    }
}

fn floor_severity(value: f64, rule: &PgFloorRule) -> Option<Severity> {
    if value < rule.critical {
        Some(Severity::High)
    } else if value < rule.floor {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Scan every metric and return the flagged minutes, largest value first.
pub fn detect_anomalies(records: &[BookingRecord], config: &AnalysisConfig) -> Vec<AnomalyRecord> {
    let mut anomalies: Vec<AnomalyRecord> = Vec::new();

    for metric in AnomalyMetric::ALL {
        let values: Vec<f64> = records.iter().map(|r| metric.value_of(r)).collect();
        let stats = MetricStats::from_values(&values);
        let threshold = stats.threshold(config.z_trigger);
        let floor = match metric {
            AnomalyMetric::PgSuccessRate => config.pg_floor.as_ref(),
            _ => None,
        };

        if stats.is_flat() {
            debug!(metric = %metric, mean = stats.mean, "Flat series, z-score scan skipped");
        }

        let before = anomalies.len();
        for (record, value) in records.iter().zip(values.iter().copied()) {
            let by_z = stats.z_score(value).and_then(|z| classify(z, config));
            let by_floor = floor.and_then(|rule| floor_severity(value, rule));

            let (severity, threshold) = match (by_z, by_floor) {
                (Some(z_sev), Some(f_sev)) => (z_sev.max(f_sev), threshold),
                (Some(z_sev), None) => (z_sev, threshold),
                (None, Some(f_sev)) => match floor {
                    Some(rule) => (f_sev, rule.floor),
                    None => continue,
                },
                (None, None) => continue,
            };

            anomalies.push(AnomalyRecord {
                minute: record.minute.clone(),
                metric,
                value,
                threshold,
                severity,
            });
        }
        debug!(
            metric = %metric,
            mean = stats.mean,
            std_dev = stats.std_dev,
            flagged = anomalies.len() - before,
            "Metric scanned"
        );
    }

    // Stable: equal values keep metric order, then time order.
    anomalies.sort_by(|a, b| b.value.total_cmp(&a.value));
    anomalies
}
