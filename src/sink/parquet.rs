use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use ::parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{io::Write, sync::Arc};

use crate::process::NormalizedRecord;

pub fn record_schema() -> Schema {
    Schema::new(vec![
        Field::new("locality", DataType::Utf8, false),
        Field::new("year", DataType::Int32, true),
        Field::new("sex", DataType::Utf8, true),
        Field::new("age_band", DataType::Utf8, true),
        Field::new("disability_type", DataType::Utf8, true),
        Field::new("rate", DataType::Float64, false),
    ])
}

/// Build a single batch holding every record, columns in CSV order.
pub fn to_record_batch(records: &[NormalizedRecord]) -> Result<RecordBatch> {
    let locality: StringArray = records.iter().map(|r| Some(r.locality.as_str())).collect();
    let year: Int32Array = records.iter().map(|r| r.year).collect();
    let sex: StringArray = records.iter().map(|r| r.sex.as_deref()).collect();
    let age: StringArray = records.iter().map(|r| r.age_band.as_deref()).collect();
    let disability: StringArray = records
        .iter()
        .map(|r| r.disability_type.as_deref())
        .collect();
    let rate = Float64Array::from_iter_values(records.iter().map(|r| r.rate));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(locality),
        Arc::new(year),
        Arc::new(sex),
        Arc::new(age),
        Arc::new(disability),
        Arc::new(rate),
    ];
    RecordBatch::try_new(Arc::new(record_schema()), columns)
        .context("building normalized record batch")
}

pub fn write_parquet<W: Write + Send>(out: W, records: &[NormalizedRecord]) -> Result<()> {
    let batch = to_record_batch(records)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(out, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
