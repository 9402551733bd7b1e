use onco_model::SourceRow;

use crate::Result;

/// Rows delivered by one load of a [`RowSource`].
#[derive(Debug, Clone, Default)]
pub struct LoadedRows {
    pub rows: Vec<SourceRow>,
    /// Records dropped because a field could not be read.
    pub skipped: usize,
}

impl LoadedRows {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        Self { rows, skipped: 0 }
    }
}

/// Supplier of raw extract rows.
///
/// Implementations are read-only views of the clinical database; a load
/// either returns every row it could read or fails as a whole.
pub trait RowSource: Send + Sync {
    fn load(&self) -> Result<LoadedRows>;

    /// Short label for log output.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl RowSource for Vec<SourceRow> {
    fn load(&self) -> Result<LoadedRows> {
        Ok(LoadedRows::new(self.clone()))
    }

    fn describe(&self) -> String {
        format!("{} in-memory rows", self.len())
    }
}
