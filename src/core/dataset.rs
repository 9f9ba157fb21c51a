use crate::domain::model::PassengerRecord;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Parses the passenger CSV; unused columns are ignored.
pub fn parse_records(data: &[u8]) -> Result<Vec<PassengerRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: PassengerRecord = row?;
        records.push(record);
    }
    Ok(records)
}

pub async fn load_dataset<S: Storage>(storage: &S, path: &str) -> Result<Vec<PassengerRecord>> {
    tracing::debug!("Reading dataset from {}", path);
    let data = storage.read_file(path).await?;
    let records = parse_records(&data)?;
    tracing::info!("📄 Loaded {} passenger records from {}", records.len(), path);
    Ok(records)
}
