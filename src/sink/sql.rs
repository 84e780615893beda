// src/sink/sql.rs

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::{io::Write, path::Path};

use crate::process::NormalizedRecord;

/// Provenance lines written as SQL comments at the top of the script.
#[derive(Debug, Clone)]
pub struct ScriptHeader {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub records: usize,
}

impl ScriptHeader {
    pub fn new(source: &Path, records: usize) -> Self {
        Self {
            source: source.display().to_string(),
            generated_at: Utc::now(),
            records,
        }
    }
}

/// Single-quoted SQL literal with embedded quotes doubled, or `NULL`.
pub fn sql_literal(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}

fn sql_int(value: Option<i32>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

pub fn create_table(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n\
         \x20   id SERIAL PRIMARY KEY,\n\
         \x20   localidade VARCHAR(255) NOT NULL,\n\
         \x20   ano INTEGER,\n\
         \x20   sexo VARCHAR(50),\n\
         \x20   faixa_idade VARCHAR(100),\n\
         \x20   tipo_deficiencia VARCHAR(255),\n\
         \x20   taxa_escolarizacao DECIMAL(5,2),\n\
         \x20   created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
         );\n"
    )
}

pub fn insert_statement(table: &str, rec: &NormalizedRecord) -> String {
    format!(
        "INSERT INTO {table} (localidade, ano, sexo, faixa_idade, tipo_deficiencia, taxa_escolarizacao) \
         VALUES ({}, {}, {}, {}, {}, {:?});",
        sql_literal(Some(&rec.locality)),
        sql_int(rec.year),
        sql_literal(rec.sex.as_deref()),
        sql_literal(rec.age_band.as_deref()),
        sql_literal(rec.disability_type.as_deref()),
        rec.rate,
    )
}

/// Header comments, create-table, truncate, then one insert per record.
/// Returns the number of inserts written.
pub fn write_sql<W: Write>(
    mut out: W,
    table: &str,
    header: &ScriptHeader,
    records: &[NormalizedRecord],
) -> Result<usize> {
    writeln!(out, "-- source: {}", header.source.replace('\n', " "))?;
    writeln!(out, "-- generated: {}", header.generated_at.to_rfc3339())?;
    writeln!(out, "-- records: {}", header.records)?;
    writeln!(out)?;
    writeln!(out, "{}", create_table(table))?;
    writeln!(out, "TRUNCATE TABLE {};", table)?;
    writeln!(out)?;
    for rec in records {
        writeln!(out, "{}", insert_statement(table, rec))?;
    }
    out.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NormalizedRecord {
        NormalizedRecord {
            locality: "Alta Floresta D'Oeste".to_string(),
            year: Some(2010),
            sex: None,
            age_band: Some("6 a 14 anos".to_string()),
            disability_type: Some("Visual".to_string()),
            rate: 12.5,
        }
    }

    #[test]
    fn test_quotes_are_doubled() {
        assert_eq!(sql_literal(Some("D'Oeste")), "'D''Oeste'");
        assert_eq!(sql_literal(None), "NULL");
    }

    #[test]
    fn test_insert_statement() {
        assert_eq!(
            insert_statement("escolarizacao_ibge", &record()),
            "INSERT INTO escolarizacao_ibge (localidade, ano, sexo, faixa_idade, tipo_deficiencia, taxa_escolarizacao) \
             VALUES ('Alta Floresta D''Oeste', 2010, NULL, '6 a 14 anos', 'Visual', 12.5);"
        );
    }

    #[test]
    fn test_integral_rate_keeps_decimal_point() {
        let mut rec = record();
        rec.rate = 8.0;
        rec.year = None;
        let stmt = insert_statement("t", &rec);
        assert!(stmt.ends_with("'Visual', 8.0);"), "{stmt}");
        assert!(stmt.contains("'Alta Floresta D''Oeste', NULL, NULL"));
    }

    #[test]
    fn test_script_layout() {
        let header = ScriptHeader::new(Path::new("tabela.xlsx"), 2);
        let mut buf = Vec::new();
        let n = write_sql(&mut buf, "escolarizacao_ibge", &header, &[record(), record()]).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("-- source: tabela.xlsx\n"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS escolarizacao_ibge (\n    id SERIAL PRIMARY KEY,\n"));
        assert!(text.contains("    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n);\n"));

        let truncate = text.find("TRUNCATE TABLE escolarizacao_ibge;").unwrap();
        let first_insert = text.find("INSERT INTO").unwrap();
        assert!(truncate < first_insert);
        assert_eq!(text.matches("INSERT INTO").count(), 2);
    }
}
