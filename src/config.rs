/// Configuration for opening or creating a WAL.
///
/// Holds the log file path and the optional parameters of the open
/// operation. Optional parameters are `Option<T>` in this struct, and
/// default values are evaluated when a getter method is called.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Path of the log file.
    pub path: String,

    /// Path of the index file. Defaults to the log path with the `.lix`
    /// suffix appended.
    pub index_path: Option<String>,

    /// Whether the WAL is opened for writing. Defaults to true.
    pub writable: Option<bool>,
}

impl Config {
    /// Suffix appended to the log path to form the default index path.
    pub const INDEX_SUFFIX: &'static str = ".lix";

    /// Creates a new Config for the given log path with default values for
    /// other fields.
    pub fn new(path: impl ToString) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }

    /// Creates a read-only Config for the given log path.
    pub fn new_read_only(path: impl ToString) -> Self {
        Self {
            path: path.to_string(),
            writable: Some(false),
            ..Default::default()
        }
    }

    /// Returns the resolved index file path.
    pub fn index_path(&self) -> String {
        match &self.index_path {
            Some(p) => p.clone(),
            None => format!("{}{}", self.path, Self::INDEX_SUFFIX),
        }
    }

    /// Returns whether the WAL is opened for writing (defaults to true).
    pub fn writable(&self) -> bool {
        self.writable.unwrap_or(true)
    }
}
