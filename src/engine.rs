use crate::schema::{CanonicalField, FinancialRatios, NormalizedStatement};
use crate::utils::{safe_div, safe_sub};

/// The per-year figures the trend pass compares across years.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrendBasis {
    pub revenue: Option<f64>,
    pub net_result: Option<f64>,
    pub total_assets: Option<f64>,
}

/// Output of the ratio engine for a single year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearComputation {
    pub ratios: FinancialRatios,
    pub basis: TrendBasis,
}

pub struct RatioEngine;

impl RatioEngine {
    /// Computes the fixed ratio catalog for one year. Missing inputs yield `None` ratios.
    pub fn compute_year(statement: &NormalizedStatement) -> YearComputation {
        let field = |f: CanonicalField| statement.get(f);

        let bancos = field(CanonicalField::Bancos);
        let clientes = field(CanonicalField::Clientes);
        let inventarios = field(CanonicalField::Inventarios);
        let activo_circulante = field(CanonicalField::TotalActivoCirculante);
        let total_activo = field(CanonicalField::TotalActivo);

        let proveedores = field(CanonicalField::Proveedores);
        let pasivo_corto = field(CanonicalField::TotalPasivoCortoPlazo);
        let pasivo_largo = field(CanonicalField::TotalPasivoLargoPlazo);
        let total_pasivo = field(CanonicalField::TotalPasivo);
        let utilidad = field(CanonicalField::UtilidadEjercicio);
        let capital_contable = field(CanonicalField::TotalCapitalContable);

        let ingresos = field(CanonicalField::Ingresos);
        let costos_venta = field(CanonicalField::CostosVenta);

        let activo_rapido = safe_sub(safe_sub(activo_circulante, inventarios), bancos);

        let ratios = FinancialRatios {
            razon_corriente: safe_div(activo_circulante, pasivo_corto),
            prueba_acida: safe_div(activo_rapido, pasivo_corto),
            capital_trabajo: safe_sub(activo_circulante, pasivo_corto),

            razon_endeudamiento: safe_div(total_pasivo, total_activo),
            razon_apalancamiento: safe_div(total_pasivo, capital_contable),
            razon_endeudamiento_largo_plazo: safe_div(pasivo_largo, total_activo),

            margen_utilidad: safe_div(utilidad, ingresos),
            roa: safe_div(utilidad, total_activo),
            roe: safe_div(utilidad, capital_contable),

            rotacion_cartera: safe_div(ingresos, clientes),
            rotacion_inventario: safe_div(costos_venta, inventarios),
            rotacion_proveedores: safe_div(costos_venta, proveedores),

            cobertura_intereses: None,
        };

        YearComputation {
            ratios,
            basis: TrendBasis {
                revenue: ingresos,
                net_result: utilidad,
                total_assets: total_activo,
            },
        }
    }
}
