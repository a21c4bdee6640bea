use crate::error::Result;
use crate::schema::{RatioName, RawStatements, TrendName, YearRatios};
use serde::Serialize;
use std::collections::BTreeMap;

/// Year → ratios (and trends), in ascending year order. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RatioReport {
    years: BTreeMap<String, YearRatios>,
}

impl RatioReport {
    pub fn new(years: BTreeMap<String, YearRatios>) -> Self {
        Self { years }
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(String::as_str)
    }

    pub fn get(&self, year: &str) -> Option<&YearRatios> {
        self.years.get(year)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &YearRatios)> {
        self.years.iter().map(|(year, ratios)| (year.as_str(), ratios))
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, YearRatios> {
        self.years
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One row per year; ratio columns then trend columns. Nulls are left blank, and the first
    /// year leaves its trend columns blank.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["year"];
        header.extend(RatioName::ALL.iter().map(|name| name.as_str()));
        header.extend(TrendName::ALL.iter().map(|name| name.as_str()));
        writer.write_record(&header)?;

        for (year, ratios) in self.iter() {
            let mut row = vec![year.to_string()];
            row.extend(RatioName::ALL.iter().map(|&name| csv_cell(ratios.ratio(name))));
            row.extend(TrendName::ALL.iter().map(|&name| csv_cell(ratios.trend(name))));
            writer.write_record(&row)?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }

    /// A table with one column per year and one row per ratio or trend.
    pub fn to_markdown(&self) -> String {
        let mut output = String::from("# Razones financieras\n\n");

        if self.years.is_empty() {
            output.push_str("_Sin años para reportar._\n");
            return output;
        }

        output.push_str("| Razón |");
        for year in self.years() {
            output.push_str(&format!(" {} |", year));
        }
        output.push_str("\n|---|");
        for _ in self.years() {
            output.push_str("---:|");
        }
        output.push('\n');

        for name in RatioName::ALL {
            output.push_str(&format!("| {} |", name.as_str()));
            for (_, ratios) in self.iter() {
                output.push_str(&format!(" {} |", markdown_cell(ratios.ratio(name))));
            }
            output.push('\n');
        }

        for name in TrendName::ALL {
            output.push_str(&format!("| {} |", name.as_str()));
            for (_, ratios) in self.iter() {
                output.push_str(&format!(" {} |", markdown_cell(ratios.trend(name))));
            }
            output.push('\n');
        }

        output
    }
}

/// Raw extracted data alongside the ratios computed from it.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialAnalysis {
    pub datos_por_anio: RawStatements,
    pub razones: RatioReport,
}

fn csv_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn markdown_cell(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "—".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FinancialRatios, TrendDeltas};

    fn sample_report() -> RatioReport {
        let mut years = BTreeMap::new();
        years.insert(
            "2019".to_string(),
            YearRatios {
                ratios: FinancialRatios {
                    razon_corriente: Some(1615.38),
                    ..FinancialRatios::default()
                },
                trends: None,
            },
        );
        years.insert(
            "2020".to_string(),
            YearRatios {
                ratios: FinancialRatios {
                    razon_corriente: Some(1714.29),
                    roe: Some(109.55),
                    ..FinancialRatios::default()
                },
                trends: Some(TrendDeltas {
                    incremento_ventas_pct: Some(-15.0),
                    incremento_utilidad_pct: Some(343.0),
                    incremento_activo_pct: None,
                }),
            },
        );
        RatioReport::new(years)
    }

    #[test]
    fn test_report_accessors() {
        let report = sample_report();
        assert_eq!(report.len(), 2);
        assert_eq!(report.years().collect::<Vec<_>>(), vec!["2019", "2020"]);
        assert_eq!(report.get("2020").unwrap().ratio(RatioName::Roe), Some(109.55));
        assert!(report.get("2018").is_none());
    }

    #[test]
    fn test_report_to_json_is_flat_per_year() {
        let json: serde_json::Value = serde_json::from_str(&sample_report().to_json().unwrap()).unwrap();
        assert_eq!(json["2019"]["razon_corriente"], serde_json::json!(1615.38));
        assert!(json["2019"].get("incremento_ventas_pct").is_none());
        assert_eq!(json["2020"]["incremento_ventas_pct"], serde_json::json!(-15.0));
        assert!(json["2020"]["incremento_activo_pct"].is_null());
    }

    #[test]
    fn test_report_to_csv() {
        let csv = sample_report().to_csv().unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("year,razon_corriente,prueba_acida"));
        assert!(header.ends_with("incremento_activo_pct"));
        assert_eq!(header.split(',').count(), 17);

        let first = lines.next().unwrap();
        assert!(first.starts_with("2019,1615.38,,"));
        assert!(first.ends_with(",,,"));

        let second = lines.next().unwrap();
        assert!(second.starts_with("2020,1714.29"));
        assert!(second.ends_with(",-15.00,343.00,"));
    }

    #[test]
    fn test_report_to_markdown() {
        let markdown = sample_report().to_markdown();
        assert!(markdown.contains("| Razón | 2019 | 2020 |"));
        assert!(markdown.contains("| razon_corriente | 1615.38 | 1714.29 |"));
        assert!(markdown.contains("| incremento_ventas_pct | — | -15.00 |"));
    }

    #[test]
    fn test_empty_report_markdown() {
        let markdown = RatioReport::default().to_markdown();
        assert!(markdown.contains("Sin años"));
    }
}
