// src/sink/mod.rs

pub mod csv;
pub mod parquet;
pub mod sql;

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

use crate::config::RunConfig;
use crate::process::{NormalizedRecord, RunSummary};

/// Write to a hidden tmp sibling, flush, then rename over `path`.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid output path {:?}", path))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let file = File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let mut out = BufWriter::new(file);
    write(&mut out).with_context(|| format!("writing {:?}", tmp_path))?;
    out.flush().with_context(|| format!("flushing {:?}", tmp_path))?;
    drop(out);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

/// Emit CSV + SQL (and Parquet / summary JSON when enabled).
pub fn write_all(cfg: &RunConfig, records: &[NormalizedRecord], summary: &RunSummary) -> Result<()> {
    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("creating output directory {:?}", cfg.out_dir))?;

    let csv_path = cfg.csv_path();
    write_atomic(&csv_path, |w| csv::write_csv(w, records).map(|_| ()))?;
    info!(path = %csv_path.display(), rows = records.len(), "wrote csv");

    let sql_path = cfg.sql_path();
    let header = sql::ScriptHeader::new(&cfg.input, records.len());
    write_atomic(&sql_path, |w| {
        sql::write_sql(w, &cfg.table, &header, records).map(|_| ())
    })?;
    info!(path = %sql_path.display(), table = %cfg.table, "wrote sql");

    if cfg.parquet {
        let pq_path = cfg.parquet_path();
        write_atomic(&pq_path, |w| parquet::write_parquet(w, records))?;
        info!(path = %pq_path.display(), "wrote parquet");
    }

    if cfg.summary_json {
        let summary_path = cfg.summary_path();
        write_atomic(&summary_path, |w| {
            serde_json::to_writer_pretty(&mut *w, summary)?;
            w.write_all(b"\n")?;
            Ok(())
        })?;
        info!(path = %summary_path.display(), "wrote summary");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_replaces_and_cleans_tmp() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, |w| {
            w.write_all(b"new")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!tmp.path().join(".out.txt.tmp").exists());
    }

    #[test]
    fn test_write_atomic_propagates_errors() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("missing").join("out.txt");
        assert!(write_atomic(&path, |_| Ok(())).is_err());
    }
}
