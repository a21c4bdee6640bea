// Prompts for per-year statement extraction. Both ask for a single JSON object keyed by year;
// the reply is still treated as free text and recovered with `extract_json`.

use crate::schema::StatementFields;

pub const ATTACHED_DOCUMENT_CONTEXT: &str = "(El documento PDF va adjunto; no se incluye como texto.)";

pub const BALANCE_SHEET_PROMPT: &str = r#"
Eres un analista financiero senior especializado en análisis crediticio bancario y en estados financieros mexicanos.

## OBJETIVO
Extrae, por año, los valores numéricos exactos de los conceptos listados abajo y devuélvelos como un único objeto JSON.

## REGLAS
- Reconoce sinónimos, abreviaturas y variantes de cada concepto (por ejemplo "Clientes", "Cuentas por cobrar", "CXC", "Deudores").
- Ignora diferencias de mayúsculas, acentos, guiones y errores ortográficos comunes.
- Un valor entre paréntesis, como (12,300), es negativo: extrae solo su valor absoluto, sin paréntesis.
- Devuelve solo enteros: sin puntos decimales, comas, espacios, signos ni símbolos de moneda.
- Si un concepto no aparece, es cero o está vacío, registra la clave con una cadena vacía "".
- No calcules, infieras ni completes datos que no estén escritos explícitamente.

## CLAVES (usa exactamente estos nombres)
Cada año debe seguir este esquema JSON:
{schema}

## FORMATO DE RESPUESTA
{
  "2023": { "Bancos": "valor", "Clientes": "valor", ... },
  "2022": { ... }
}

### CONTEXTO
{context}

### RESPUESTA
"#;

pub const INCOME_STATEMENT_PROMPT: &str = r#"
Eres un experto en estados de resultado integral auditados.

## OBJETIVO
Para cada año presente en el contexto, extrae únicamente estos conceptos:
- Ingresos
- Costos de venta y/o servicio
- Utilidad o pérdida del ejercicio

## REGLAS
- Un valor entre paréntesis, como (1000), es una pérdida: extrae solo el valor absoluto ("1000").
- Sin signos, símbolos de moneda, letras, comas ni puntos decimales; solo el entero.
- Si un concepto no aparece, déjalo como cadena vacía "".
- No realices cálculos ni agregues conceptos adicionales.

## FORMATO DE RESPUESTA
{
  "AÑO": {
    "Ingresos": "...",
    "Costos de venta y/o servicio": "...",
    "Utilidad o pérdida del ejercicio": "..."
  }
}

### CONTEXTO
{context}

### RESPUESTA
"#;

/// The balance sheet prompt with the per-year schema and context filled in.
pub fn balance_sheet_prompt(context: &str) -> Result<String, serde_json::Error> {
    let schema = StatementFields::schema_as_json()?;
    Ok(BALANCE_SHEET_PROMPT
        .trim()
        .replace("{schema}", &schema)
        .replace("{context}", context))
}

pub fn income_statement_prompt(context: &str) -> String {
    INCOME_STATEMENT_PROMPT.trim().replace("{context}", context)
}
