use std::collections::BTreeMap;

use crate::analyzers::types::{CityMeans, CityRiskCounts, Kpis, SummaryMetrics, TrendPoint};
use crate::analyzers::utility::{argmax, mean, pct};
use crate::error::EtlError;
use crate::transform::category::RiskLevel;
use crate::transform::dataset::Dataset;

/// Present values of each averaged column for one city.
#[derive(Default)]
struct CitySeries {
    rows: usize,
    pm2_5: Vec<f64>,
    pm10: Vec<f64>,
    carbon_monoxide: Vec<f64>,
    nitrogen_dioxide: Vec<f64>,
    sulphur_dioxide: Vec<f64>,
    ozone: Vec<f64>,
    severity: Vec<f64>,
    risk: [usize; 3],
}

/// Computes KPIs, per-city means, the city × risk contingency table and the
/// trend projection of a dataset.
///
/// Groups are visited in city (or hour) order, so argmax ties resolve to the
/// lexically smallest city and the earliest hour.
///
/// # Errors
///
/// Returns [`EtlError::EmptyDataset`] if the dataset has no rows.
pub fn summarize(dataset: &Dataset) -> Result<SummaryMetrics, EtlError> {
    if dataset.is_empty() {
        return Err(EtlError::EmptyDataset);
    }

    let mut cities: BTreeMap<&str, CitySeries> = BTreeMap::new();
    let mut hours: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    let mut risk_totals = [0usize; 3];

    for row in dataset.rows() {
        let series = cities.entry(row.city.as_str()).or_default();
        series.rows += 1;

        macro_rules! push_field {
            ($name:ident) => {
                if let Some(v) = row.$name.value() {
                    series.$name.push(v);
                }
            };
        }

        push_field!(pm2_5);
        push_field!(pm10);
        push_field!(carbon_monoxide);
        push_field!(nitrogen_dioxide);
        push_field!(sulphur_dioxide);
        push_field!(ozone);
        push_field!(severity);

        series.risk[row.risk_level as usize] += 1;
        risk_totals[row.risk_level as usize] += 1;

        if let (Some(hour), Some(pm2_5)) = (row.hour, row.pm2_5.value()) {
            hours.entry(hour).or_default().push(pm2_5);
        }
    }

    let city_means: Vec<CityMeans> = cities
        .iter()
        .map(|(city, s)| CityMeans {
            city: city.to_string(),
            rows: s.rows,
            pm2_5: mean(&s.pm2_5),
            pm10: mean(&s.pm10),
            carbon_monoxide: mean(&s.carbon_monoxide),
            nitrogen_dioxide: mean(&s.nitrogen_dioxide),
            sulphur_dioxide: mean(&s.sulphur_dioxide),
            ozone: mean(&s.ozone),
            severity: mean(&s.severity),
        })
        .collect();

    let total = dataset.len();
    let kpis = Kpis {
        city_highest_pm25: argmax(city_means.iter().map(|m| (m.city.clone(), m.pm2_5))),
        city_highest_severity: argmax(city_means.iter().map(|m| (m.city.clone(), m.severity))),
        worst_hour: argmax(hours.iter().map(|(hour, values)| (*hour, mean(values)))),
        high_risk_pct: pct(risk_totals[RiskLevel::High as usize], total),
        moderate_risk_pct: pct(risk_totals[RiskLevel::Moderate as usize], total),
        low_risk_pct: pct(risk_totals[RiskLevel::Low as usize], total),
    };

    let city_risk = cities
        .iter()
        .map(|(city, s)| CityRiskCounts {
            city: city.to_string(),
            low: s.risk[RiskLevel::Low as usize],
            moderate: s.risk[RiskLevel::Moderate as usize],
            high: s.risk[RiskLevel::High as usize],
        })
        .collect();

    let trend = dataset
        .rows()
        .iter()
        .map(|row| TrendPoint {
            city: row.city.clone(),
            time: row.time,
            pm2_5: row.pm2_5,
            pm10: row.pm10,
            ozone: row.ozone,
        })
        .collect();

    Ok(SummaryMetrics {
        kpis,
        city_means,
        city_risk,
        trend,
    })
}
