// src/config.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

pub const DEFAULT_TABLE: &str = "escolarizacao_ibge";
pub const DEFAULT_STEM: &str = "escolarizacao_normalized";

static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid regex")
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("table name `{0}` is not a plain SQL identifier")]
    InvalidTable(String),
    #[error("data_start_row {data_start_row} must be below {category} row {row}")]
    DataOverlapsHeader {
        category: &'static str,
        row: usize,
        data_start_row: usize,
    },
}

/// Where the category rows and the data region sit in the sheet (0-based).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub year_row: Option<usize>,
    pub sex_row: Option<usize>,
    pub age_row: Option<usize>,
    pub disability_row: Option<usize>,
    pub data_start_row: usize,
    pub locality_column: usize,
}

impl Default for Layout {
    /// Layout of the IBGE schooling table (Tabela 10139) export.
    fn default() -> Self {
        Self {
            year_row: Some(3),
            sex_row: Some(4),
            age_row: Some(5),
            disability_row: Some(6),
            data_start_row: 7,
            locality_column: 0,
        }
    }
}

impl Layout {
    /// Category rows that are present, labelled for diagnostics.
    pub fn category_rows(&self) -> impl Iterator<Item = (&'static str, usize)> {
        [
            ("year", self.year_row),
            ("sex", self.sex_row),
            ("age", self.age_row),
            ("disability", self.disability_row),
        ]
        .into_iter()
        .filter_map(|(name, row)| row.map(|r| (name, r)))
    }

    /// True when `(row, col)` holds a rate rather than a label.
    pub fn is_value_cell(&self, row: usize, col: usize) -> bool {
        row >= self.data_start_row && col != self.locality_column
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (category, row) in self.category_rows() {
            if row >= self.data_start_row {
                return Err(ConfigError::DataOverlapsHeader {
                    category,
                    row,
                    data_start_row: self.data_start_row,
                });
            }
        }
        Ok(())
    }
}

/// Contents of an optional YAML config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sheet: Option<String>,
    pub table: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub stem: Option<String>,
    pub parquet: Option<bool>,
    pub summary_json: Option<bool>,
    pub layout: Option<Layout>,
}

impl FileConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A category row given on the command line: an index, or `-` / `none`
/// to mark the category as absent from the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpec(pub Option<usize>);

impl FromStr for RowSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-" || s.eq_ignore_ascii_case("none") {
            return Ok(RowSpec(None));
        }
        s.parse::<usize>()
            .map(|r| RowSpec(Some(r)))
            .map_err(|_| format!("expected a row index, `-` or `none`, got `{}`", s))
    }
}

/// Layout flags shared by every binary. Unset flags leave the lower layer alone.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LayoutOverrides {
    /// Row holding the year labels (`-` if the sheet has none)
    #[arg(long)]
    pub year_row: Option<RowSpec>,

    #[arg(long)]
    pub sex_row: Option<RowSpec>,

    #[arg(long)]
    pub age_row: Option<RowSpec>,

    #[arg(long)]
    pub disability_row: Option<RowSpec>,

    /// First row of the data region (0-based)
    #[arg(long)]
    pub data_start_row: Option<usize>,

    #[arg(long)]
    pub locality_column: Option<usize>,
}

impl LayoutOverrides {
    pub fn apply(&self, layout: &mut Layout) {
        if let Some(RowSpec(row)) = self.year_row {
            layout.year_row = row;
        }
        if let Some(RowSpec(row)) = self.sex_row {
            layout.sex_row = row;
        }
        if let Some(RowSpec(row)) = self.age_row {
            layout.age_row = row;
        }
        if let Some(RowSpec(row)) = self.disability_row {
            layout.disability_row = row;
        }
        if let Some(row) = self.data_start_row {
            layout.data_start_row = row;
        }
        if let Some(col) = self.locality_column {
            layout.locality_column = col;
        }
    }
}

/// Command-line values for one run.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sheet: Option<String>,
    pub table: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub stem: Option<String>,
    pub parquet: bool,
    pub summary_json: bool,
    pub layout: LayoutOverrides,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub table: String,
    pub out_dir: PathBuf,
    pub stem: String,
    pub parquet: bool,
    pub summary_json: bool,
    pub layout: Layout,
}

impl RunConfig {
    /// Defaults for `input`, before any file or flag overrides.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            sheet: None,
            table: DEFAULT_TABLE.to_string(),
            out_dir: PathBuf::from("."),
            stem: DEFAULT_STEM.to_string(),
            parquet: false,
            summary_json: false,
            layout: Layout::default(),
        }
    }

    /// Overlay the values present in a config file.
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        if let Some(sheet) = file.sheet {
            self.sheet = Some(sheet);
        }
        if let Some(table) = file.table {
            self.table = table;
        }
        if let Some(out_dir) = file.out_dir {
            self.out_dir = out_dir;
        }
        if let Some(stem) = file.stem {
            self.stem = stem;
        }
        if let Some(parquet) = file.parquet {
            self.parquet = parquet;
        }
        if let Some(summary_json) = file.summary_json {
            self.summary_json = summary_json;
        }
        if let Some(layout) = file.layout {
            self.layout = layout;
        }
        self
    }

    /// Overlay command-line values; switches only ever turn outputs on.
    pub fn merge_overrides(mut self, o: Overrides) -> Self {
        if let Some(sheet) = o.sheet {
            self.sheet = Some(sheet);
        }
        if let Some(table) = o.table {
            self.table = table;
        }
        if let Some(out_dir) = o.out_dir {
            self.out_dir = out_dir;
        }
        if let Some(stem) = o.stem {
            self.stem = stem;
        }
        self.parquet |= o.parquet;
        self.summary_json |= o.summary_json;
        o.layout.apply(&mut self.layout);
        self
    }

    /// defaults → YAML file → command line, then validate.
    pub fn resolve(
        input: impl Into<PathBuf>,
        config_file: Option<&Path>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let mut cfg = RunConfig::new(input);
        if let Some(path) = config_file {
            cfg = cfg.merge_file(FileConfig::from_path(path)?);
        }
        let cfg = cfg.merge_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !IDENT_RE.is_match(&self.table) {
            return Err(ConfigError::InvalidTable(self.table.clone()));
        }
        self.layout.validate()
    }

    pub fn csv_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.csv", self.stem))
    }

    pub fn sql_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.sql", self.stem))
    }

    pub fn parquet_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.parquet", self.stem))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.summary.json", self.stem))
    }
}
