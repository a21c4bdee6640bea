use financial_ratio_engine::*;
use serde_json::json;
use std::error::Error;
use std::fs::File;
use std::io::Write;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    println!("📊 Computing bank-style ratios from corrected statement data...");

    // Data as a reviewer might send it back after fixing an extraction by hand.
    let statements = parse_statements(json!({
        "2021": {
            "Bancos": "85,000",
            "Clientes": "410,000",
            "Inventarios": "620,000",
            "Total Activo Circulante": "1,250,000",
            "Total Activo": "3,900,000",
            "Proveedores": "(380,000)",
            "Total Pasivo a Corto Plazo": "540,000",
            "Total Pasivo a Largo Plazo": "900,000",
            "Total Pasivo": "1,440,000",
            "Utilidad o pérdida del ejercicio": "310,000",
            "Total Capital Contable": "2,460,000",
            "Ingresos": "$ 5,800,000 MXN",
            "Costos de venta y/o servicio": "4,100,000"
        },
        "2022": {
            "Bancos": "120,000",
            "Clientes": "455,000",
            "Inventarios": "n/a",
            "Total Activo Circulante": "1,420,000",
            "Total Activo": "4,300,000",
            "Proveedores": "395,000",
            "Total Pasivo a Corto Plazo": "560,000",
            "Total Pasivo a Largo Plazo": "850,000",
            "Total Pasivo": "1,410,000",
            "Utilidad o pérdida del ejercicio": "(95,000)",
            "Total Capital Contable": "2,890,000",
            "Ingresos": "6,150,000",
            "Costos de venta y/o servicio": "4,480,000"
        }
    }))?;

    let report = RatioProcessor::recalculate(&statements)?;

    println!("\n{}", report.to_markdown());

    let mut file = File::create("ratio_report.csv")?;
    file.write_all(report.to_csv()?.as_bytes())?;
    println!("💾 CSV written to ratio_report.csv");

    println!("\n📄 JSON:\n{}", report.to_json()?);

    Ok(())
}
