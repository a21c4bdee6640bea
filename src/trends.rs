use crate::engine::{TrendBasis, YearComputation};
use crate::schema::{TrendDeltas, YearRatios};
use crate::utils::{safe_div, safe_mul, safe_sub};
use std::collections::BTreeMap;

/// Percentage change from `previous` to `current`, or `None` when either side is missing or the
/// previous value is zero.
pub fn percentage_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let delta = safe_sub(current, previous);
    safe_mul(safe_div(delta, previous), Some(100.0))
}

pub struct TrendCalculator;

impl TrendCalculator {
    /// Attaches year-over-year deltas to every year after the first.
    ///
    /// `per_year` must already be in ascending year order; each year is compared with the one
    /// immediately before it in the slice.
    pub fn append_trends(per_year: &[(String, YearComputation)]) -> BTreeMap<String, YearRatios> {
        let mut output = BTreeMap::new();
        let mut previous: Option<&TrendBasis> = None;

        for (year, computation) in per_year {
            let trends = previous.map(|prev| Self::deltas(&computation.basis, prev));
            output.insert(
                year.clone(),
                YearRatios {
                    ratios: computation.ratios.clone(),
                    trends,
                },
            );
            previous = Some(&computation.basis);
        }

        output
    }

    fn deltas(current: &TrendBasis, previous: &TrendBasis) -> TrendDeltas {
        TrendDeltas {
            incremento_ventas_pct: percentage_change(current.revenue, previous.revenue),
            incremento_utilidad_pct: percentage_change(current.net_result, previous.net_result),
            incremento_activo_pct: percentage_change(current.total_assets, previous.total_assets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(revenue: Option<f64>, net_result: Option<f64>, total_assets: Option<f64>) -> YearComputation {
        YearComputation {
            ratios: Default::default(),
            basis: TrendBasis {
                revenue,
                net_result,
                total_assets,
            },
        }
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(Some(120.0), Some(100.0)), Some(20.0));
        assert_eq!(percentage_change(Some(26_507_587.0), Some(31_084_188.0)), Some(-15.0));
        assert_eq!(percentage_change(Some(50.0), Some(0.0)), None);
        assert_eq!(percentage_change(Some(50.0), None), None);
        assert_eq!(percentage_change(None, Some(50.0)), None);
    }

    #[test]
    fn test_first_year_has_no_trends() {
        let per_year = vec![
            ("2019".to_string(), year(Some(100.0), Some(10.0), Some(1000.0))),
            ("2020".to_string(), year(Some(150.0), Some(5.0), Some(1000.0))),
        ];

        let output = TrendCalculator::append_trends(&per_year);

        assert_eq!(output.len(), 2);
        assert!(output["2019"].trends.is_none());
        let trends = output["2020"].trends.as_ref().unwrap();
        assert_eq!(trends.incremento_ventas_pct, Some(50.0));
        assert_eq!(trends.incremento_utilidad_pct, Some(-50.0));
        assert_eq!(trends.incremento_activo_pct, Some(0.0));
    }

    #[test]
    fn test_each_year_compares_with_its_immediate_predecessor() {
        let per_year = vec![
            ("2019".to_string(), year(Some(100.0), None, None)),
            ("2020".to_string(), year(Some(200.0), None, Some(10.0))),
            ("2021".to_string(), year(Some(300.0), Some(1.0), Some(0.0))),
            ("2022".to_string(), year(Some(300.0), Some(2.0), Some(5.0))),
        ];

        let output = TrendCalculator::append_trends(&per_year);

        assert_eq!(output["2020"].trends.as_ref().unwrap().incremento_ventas_pct, Some(100.0));
        assert_eq!(output["2021"].trends.as_ref().unwrap().incremento_ventas_pct, Some(50.0));
        assert_eq!(output["2022"].trends.as_ref().unwrap().incremento_ventas_pct, Some(0.0));

        // Missing predecessor value and zero predecessor both give null.
        assert_eq!(output["2021"].trends.as_ref().unwrap().incremento_utilidad_pct, None);
        assert_eq!(output["2022"].trends.as_ref().unwrap().incremento_activo_pct, None);
        assert_eq!(output["2021"].trends.as_ref().unwrap().incremento_activo_pct, Some(-100.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(TrendCalculator::append_trends(&[]).is_empty());
    }
}
