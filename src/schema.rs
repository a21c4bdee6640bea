use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A raw scalar as handed over by the extraction step: a string, a number, or null.
pub type RawValue = serde_json::Value;

/// Free-text line item label → raw value, for one year.
pub type RawYearStatement = BTreeMap<String, RawValue>;

/// Year key (e.g. "2022") → raw line items. Keys iterate in ascending lexicographic order.
pub type RawStatements = BTreeMap<String, RawYearStatement>;

/// The fixed catalog of balance sheet and income statement line items the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CanonicalField {
    #[serde(rename = "bancos")]
    Bancos,
    #[serde(rename = "clientes")]
    Clientes,
    #[serde(rename = "inventarios")]
    Inventarios,
    #[serde(rename = "total activo circulante")]
    TotalActivoCirculante,
    #[serde(rename = "total activo no circulante")]
    TotalActivoNoCirculante,
    #[serde(rename = "total activo")]
    TotalActivo,
    #[serde(rename = "proveedores")]
    Proveedores,
    #[serde(rename = "total pasivo a corto plazo")]
    TotalPasivoCortoPlazo,
    #[serde(rename = "total pasivo a largo plazo")]
    TotalPasivoLargoPlazo,
    #[serde(rename = "total pasivo")]
    TotalPasivo,
    #[serde(rename = "capital social")]
    CapitalSocial,
    #[serde(rename = "utilidad o pérdida del ejercicio")]
    UtilidadEjercicio,
    #[serde(rename = "total capital contable")]
    TotalCapitalContable,
    #[serde(rename = "total pasivo y capital contable")]
    TotalPasivoYCapitalContable,
    #[serde(rename = "ingresos")]
    Ingresos,
    #[serde(rename = "costos de venta y/o servicio")]
    CostosVenta,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 16] = [
        CanonicalField::Bancos,
        CanonicalField::Clientes,
        CanonicalField::Inventarios,
        CanonicalField::TotalActivoCirculante,
        CanonicalField::TotalActivoNoCirculante,
        CanonicalField::TotalActivo,
        CanonicalField::Proveedores,
        CanonicalField::TotalPasivoCortoPlazo,
        CanonicalField::TotalPasivoLargoPlazo,
        CanonicalField::TotalPasivo,
        CanonicalField::CapitalSocial,
        CanonicalField::UtilidadEjercicio,
        CanonicalField::TotalCapitalContable,
        CanonicalField::TotalPasivoYCapitalContable,
        CanonicalField::Ingresos,
        CanonicalField::CostosVenta,
    ];

    /// Lower-case catalog label, as matched against incoming line item labels.
    pub fn label(self) -> &'static str {
        match self {
            CanonicalField::Bancos => "bancos",
            CanonicalField::Clientes => "clientes",
            CanonicalField::Inventarios => "inventarios",
            CanonicalField::TotalActivoCirculante => "total activo circulante",
            CanonicalField::TotalActivoNoCirculante => "total activo no circulante",
            CanonicalField::TotalActivo => "total activo",
            CanonicalField::Proveedores => "proveedores",
            CanonicalField::TotalPasivoCortoPlazo => "total pasivo a corto plazo",
            CanonicalField::TotalPasivoLargoPlazo => "total pasivo a largo plazo",
            CanonicalField::TotalPasivo => "total pasivo",
            CanonicalField::CapitalSocial => "capital social",
            CanonicalField::UtilidadEjercicio => "utilidad o pérdida del ejercicio",
            CanonicalField::TotalCapitalContable => "total capital contable",
            CanonicalField::TotalPasivoYCapitalContable => "total pasivo y capital contable",
            CanonicalField::Ingresos => "ingresos",
            CanonicalField::CostosVenta => "costos de venta y/o servicio",
        }
    }

    /// Case-insensitive lookup of a raw label. Surrounding whitespace is ignored; anything else
    /// must match the catalog label exactly.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|field| field.label() == wanted)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One year's line items after label canonicalization and numeric normalization.
///
/// A field that was present but unparsable is stored as `None`; a field that never appeared is
/// absent. Both read back as `None` through [`NormalizedStatement::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedStatement {
    values: BTreeMap<CanonicalField, Option<f64>>,
}

impl NormalizedStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: CanonicalField, value: Option<f64>) {
        self.values.insert(field, value);
    }

    pub fn with(mut self, field: CanonicalField, value: f64) -> Self {
        self.insert(field, Some(value));
        self
    }

    pub fn get(&self, field: CanonicalField) -> Option<f64> {
        self.values.get(&field).copied().flatten()
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.values.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, Option<f64>)> + '_ {
        self.values.iter().map(|(field, value)| (*field, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The fixed ratio catalog, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatioName {
    RazonCorriente,
    PruebaAcida,
    CapitalTrabajo,
    RazonEndeudamiento,
    RazonApalancamiento,
    RazonEndeudamientoLargoPlazo,
    MargenUtilidad,
    Roa,
    Roe,
    RotacionCartera,
    RotacionInventario,
    RotacionProveedores,
    CoberturaIntereses,
}

impl RatioName {
    pub const ALL: [RatioName; 13] = [
        RatioName::RazonCorriente,
        RatioName::PruebaAcida,
        RatioName::CapitalTrabajo,
        RatioName::RazonEndeudamiento,
        RatioName::RazonApalancamiento,
        RatioName::RazonEndeudamientoLargoPlazo,
        RatioName::MargenUtilidad,
        RatioName::Roa,
        RatioName::Roe,
        RatioName::RotacionCartera,
        RatioName::RotacionInventario,
        RatioName::RotacionProveedores,
        RatioName::CoberturaIntereses,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RatioName::RazonCorriente => "razon_corriente",
            RatioName::PruebaAcida => "prueba_acida",
            RatioName::CapitalTrabajo => "capital_trabajo",
            RatioName::RazonEndeudamiento => "razon_endeudamiento",
            RatioName::RazonApalancamiento => "razon_apalancamiento",
            RatioName::RazonEndeudamientoLargoPlazo => "razon_endeudamiento_largo_plazo",
            RatioName::MargenUtilidad => "margen_utilidad",
            RatioName::Roa => "roa",
            RatioName::Roe => "roe",
            RatioName::RotacionCartera => "rotacion_cartera",
            RatioName::RotacionInventario => "rotacion_inventario",
            RatioName::RotacionProveedores => "rotacion_proveedores",
            RatioName::CoberturaIntereses => "cobertura_intereses",
        }
    }
}

/// Year-over-year percentage changes, present on every year except the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrendName {
    IncrementoVentasPct,
    IncrementoUtilidadPct,
    IncrementoActivoPct,
}

impl TrendName {
    pub const ALL: [TrendName; 3] = [
        TrendName::IncrementoVentasPct,
        TrendName::IncrementoUtilidadPct,
        TrendName::IncrementoActivoPct,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TrendName::IncrementoVentasPct => "incremento_ventas_pct",
            TrendName::IncrementoUtilidadPct => "incremento_utilidad_pct",
            TrendName::IncrementoActivoPct => "incremento_activo_pct",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatios {
    // Liquidity
    pub razon_corriente: Option<f64>,
    pub prueba_acida: Option<f64>,
    pub capital_trabajo: Option<f64>,

    // Leverage
    pub razon_endeudamiento: Option<f64>,
    pub razon_apalancamiento: Option<f64>,
    pub razon_endeudamiento_largo_plazo: Option<f64>,

    // Profitability
    pub margen_utilidad: Option<f64>,
    pub roa: Option<f64>,
    pub roe: Option<f64>,

    // Efficiency
    pub rotacion_cartera: Option<f64>,
    pub rotacion_inventario: Option<f64>,
    pub rotacion_proveedores: Option<f64>,

    /// Always `None`: the catalog has no interest expense line item yet.
    pub cobertura_intereses: Option<f64>,
}

impl FinancialRatios {
    pub fn get(&self, name: RatioName) -> Option<f64> {
        match name {
            RatioName::RazonCorriente => self.razon_corriente,
            RatioName::PruebaAcida => self.prueba_acida,
            RatioName::CapitalTrabajo => self.capital_trabajo,
            RatioName::RazonEndeudamiento => self.razon_endeudamiento,
            RatioName::RazonApalancamiento => self.razon_apalancamiento,
            RatioName::RazonEndeudamientoLargoPlazo => self.razon_endeudamiento_largo_plazo,
            RatioName::MargenUtilidad => self.margen_utilidad,
            RatioName::Roa => self.roa,
            RatioName::Roe => self.roe,
            RatioName::RotacionCartera => self.rotacion_cartera,
            RatioName::RotacionInventario => self.rotacion_inventario,
            RatioName::RotacionProveedores => self.rotacion_proveedores,
            RatioName::CoberturaIntereses => self.cobertura_intereses,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (RatioName, Option<f64>)> + '_ {
        RatioName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendDeltas {
    pub incremento_ventas_pct: Option<f64>,
    pub incremento_utilidad_pct: Option<f64>,
    pub incremento_activo_pct: Option<f64>,
}

impl TrendDeltas {
    pub fn get(&self, name: TrendName) -> Option<f64> {
        match name {
            TrendName::IncrementoVentasPct => self.incremento_ventas_pct,
            TrendName::IncrementoUtilidadPct => self.incremento_utilidad_pct,
            TrendName::IncrementoActivoPct => self.incremento_activo_pct,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (TrendName, Option<f64>)> + '_ {
        TrendName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

/// Final per-year output: the ratio catalog, plus trend fields for every year but the first.
/// Serializes as one flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearRatios {
    #[serde(flatten)]
    pub ratios: FinancialRatios,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub trends: Option<TrendDeltas>,
}

impl YearRatios {
    pub fn ratio(&self, name: RatioName) -> Option<f64> {
        self.ratios.get(name)
    }

    pub fn trend(&self, name: TrendName) -> Option<f64> {
        self.trends.as_ref().and_then(|trends| trends.get(name))
    }
}

/// The record one year of extraction is expected to follow. Used to render the JSON schema
/// embedded in extraction prompts; every entry is an optional string so the model can return
/// "" for missing concepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StatementFields {
    #[serde(rename = "Bancos", default)]
    #[schemars(description = "Cash and bank balances. Synonyms: Disponibilidades, Efectivo, Cuentas bancarias.")]
    pub bancos: Option<String>,

    #[serde(rename = "Clientes", default)]
    #[schemars(description = "Accounts receivable. Synonyms: Cuentas por cobrar, CXC, Deudores.")]
    pub clientes: Option<String>,

    #[serde(rename = "Inventarios", default)]
    #[schemars(description = "Inventory. Synonyms: Existencias, Stock, Mercancía.")]
    pub inventarios: Option<String>,

    #[serde(rename = "Total Activo Circulante", default)]
    #[schemars(description = "Total current assets. Synonyms: Activo corriente, Suma activo circulante.")]
    pub total_activo_circulante: Option<String>,

    #[serde(rename = "Total Activo No Circulante", default)]
    #[schemars(description = "Total non-current assets. Synonyms: Activo no corriente.")]
    pub total_activo_no_circulante: Option<String>,

    #[serde(rename = "Total Activo", default)]
    #[schemars(description = "Total assets.")]
    pub total_activo: Option<String>,

    #[serde(rename = "Proveedores", default)]
    #[schemars(description = "Accounts payable. Synonyms: Cuentas por pagar, Acreedores, CXP.")]
    pub proveedores: Option<String>,

    #[serde(rename = "Total Pasivo a Corto Plazo", default)]
    #[schemars(description = "Total short-term liabilities. Synonyms: Pasivo circulante.")]
    pub total_pasivo_corto_plazo: Option<String>,

    #[serde(rename = "Total Pasivo a Largo Plazo", default)]
    #[schemars(description = "Total long-term liabilities. Synonyms: Pasivo no circulante.")]
    pub total_pasivo_largo_plazo: Option<String>,

    #[serde(rename = "Total Pasivo", default)]
    #[schemars(description = "Total liabilities.")]
    pub total_pasivo: Option<String>,

    #[serde(rename = "Capital Social", default)]
    #[schemars(description = "Share capital. Synonyms: Capital pagado, Capital suscrito.")]
    pub capital_social: Option<String>,

    #[serde(rename = "Utilidad o pérdida del ejercicio", default)]
    #[schemars(description = "Net result for the year. Synonyms: Resultado neto, Utilidad neta. Absolute value only.")]
    pub utilidad_ejercicio: Option<String>,

    #[serde(rename = "Total Capital Contable", default)]
    #[schemars(description = "Total equity. Synonyms: Patrimonio, Capital contable.")]
    pub total_capital_contable: Option<String>,

    #[serde(rename = "Total Pasivo y Capital Contable", default)]
    #[schemars(description = "Total liabilities and equity. Synonyms: Suma pasivo y capital.")]
    pub total_pasivo_y_capital_contable: Option<String>,

    #[serde(rename = "Ingresos", default)]
    #[schemars(description = "Revenue. Synonyms: Ventas, Ingresos operativos.")]
    pub ingresos: Option<String>,

    #[serde(rename = "Costos de venta y/o servicio", default)]
    #[schemars(description = "Cost of sales and/or services. Synonyms: Costos ventas, Costos servicios.")]
    pub costos_venta: Option<String>,
}

impl StatementFields {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StatementFields)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_lookup_is_case_insensitive() {
        assert_eq!(
            CanonicalField::from_label("Total Activo Circulante"),
            Some(CanonicalField::TotalActivoCirculante)
        );
        assert_eq!(
            CanonicalField::from_label("UTILIDAD O PÉRDIDA DEL EJERCICIO"),
            Some(CanonicalField::UtilidadEjercicio)
        );
        assert_eq!(CanonicalField::from_label("  bancos "), Some(CanonicalField::Bancos));
        assert_eq!(CanonicalField::from_label("Cuentas por cobrar"), None);
        assert_eq!(CanonicalField::from_label("total activos"), None);
    }

    #[test]
    fn test_every_label_round_trips_through_lookup() {
        for field in CanonicalField::ALL {
            assert_eq!(CanonicalField::from_label(field.label()), Some(field));
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.label()));
        }
    }

    #[test]
    fn test_ratio_names_match_serialized_keys() {
        let value = serde_json::to_value(FinancialRatios::default()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), RatioName::ALL.len());
        for name in RatioName::ALL {
            assert!(keys.contains(&name.as_str()), "missing {}", name.as_str());
        }
    }

    #[test]
    fn test_year_ratios_without_trends_has_no_trend_keys() {
        let year = YearRatios::default();
        let value = serde_json::to_value(&year).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 13);
        assert!(object.keys().all(|k| !k.starts_with("incremento_")));

        let with_trends = YearRatios {
            ratios: FinancialRatios::default(),
            trends: Some(TrendDeltas {
                incremento_ventas_pct: Some(-14.72),
                ..TrendDeltas::default()
            }),
        };
        let value = serde_json::to_value(&with_trends).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 16);
        assert_eq!(object["incremento_ventas_pct"], serde_json::json!(-14.72));
        assert!(object["incremento_activo_pct"].is_null());
    }

    #[test]
    fn test_normalized_statement_serializes_with_catalog_labels() {
        let mut statement = NormalizedStatement::new().with(CanonicalField::TotalActivo, 100.0);
        statement.insert(CanonicalField::Bancos, None);

        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["total activo"], serde_json::json!(100.0));
        assert!(json["bancos"].is_null());
        assert_eq!(statement.get(CanonicalField::Bancos), None);
        assert!(statement.contains(CanonicalField::Bancos));
        assert!(!statement.contains(CanonicalField::Clientes));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = StatementFields::schema_as_json().unwrap();
        assert!(schema_json.contains("Total Activo Circulante"));
        assert!(schema_json.contains("Costos de venta y/o servicio"));
        assert!(schema_json.contains("Cuentas por cobrar"));
    }
}
