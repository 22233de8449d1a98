use crate::error::{Result, WorkZenError};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Deserializes the rows of a headed CSV input into any row type.
///
/// Fields are trimmed and rows may be shorter than the header, so optional
/// trailing columns (a missing wage or department) can be left out.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// One item per row. A malformed row yields an `Err` for that row only
    /// and reading carries on with the next.
    pub fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WorkZenError::from))
    }
}
