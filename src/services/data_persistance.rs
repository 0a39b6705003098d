use std::path::Path;

use crate::domain::product::ProductRecord;

/// Write the dataset as UTF-8 CSV with a `Title,Price,Star Rating` header
/// row, creating parent directories as needed. Missing fields become empty
/// cells.
pub fn save_dataset(path: impl AsRef<Path>, records: &[ProductRecord]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Read a previously saved dataset back, using the header row as column
/// names. Empty cells come back as `None`.
pub fn load_dataset(path: impl AsRef<Path>) -> anyhow::Result<Vec<ProductRecord>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let records = reader.deserialize().collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}
