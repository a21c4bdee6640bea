use financial_ratio_engine::*;
use std::error::Error;

// What a generative model typically returns: prose around a fenced JSON block.
const MODEL_REPLY: &str = r#"Claro, a continuación presento los valores extraídos del estado de situación financiera:

```json
{
  "2023": {
    "Bancos": "1,204,330",
    "Clientes": "3,118,500",
    "Inventarios": "",
    "Total Activo Circulante": "5,870,221",
    "Total Activo": "14,002,117",
    "Total Pasivo a Corto Plazo": "2,930,004",
    "Total Pasivo": "6,441,870",
    "Total Capital Contable": "7,560,247",
    "Utilidad o pérdida del ejercicio": "(402,118)",
    "Ingresos": "18,330,902"
  }
}
```

Nota: el rubro de inventarios no aparece en el documento."#;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    println!("🔎 Recovering JSON from model output...");

    let value = extract_json(MODEL_REPLY)?;
    let statements = parse_statements(value)?;
    println!("✅ Recovered {} year(s)", statements.len());

    for (year, items) in &statements {
        let normalized = normalize_statement(items);
        println!("\n{} ({} recognized line items)", year, normalized.len());
        for (field, value) in normalized.iter() {
            match value {
                Some(v) => println!("  {:<35} {:>15.0}", field.label(), v),
                None => println!("  {:<35} {:>15}", field.label(), "—"),
            }
        }
    }

    let report = compute_financial_ratios(&statements);
    println!("\n{}", report.to_markdown());

    match extract_json("Lo siento, no pude procesar el archivo.") {
        Ok(_) => println!("Unexpectedly recovered JSON"),
        Err(e) => println!("❌ Expected failure on prose-only reply: {}", e),
    }

    Ok(())
}
