use serde::{Deserialize, Serialize};

/// Logical datastore identity: what the backend actually stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalDatastore {
    Configuration,
    Operational,
}

impl LogicalDatastore {
    /// The wire/display name of this datastore
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalDatastore::Configuration => "configuration",
            LogicalDatastore::Operational => "operational",
        }
    }
}

impl std::fmt::Display for LogicalDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Protocol-layer datastore view
///
/// Candidate and running are both views over CONFIGURATION: candidate is
/// the per-session scratch tree, running the committed tree. Operational
/// maps straight onto the operational logical datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datastore {
    Candidate,
    Running,
    Operational,
}

impl Datastore {
    /// The logical datastore this view reads from / writes to
    pub fn logical(&self) -> LogicalDatastore {
        match self {
            Datastore::Candidate | Datastore::Running => LogicalDatastore::Configuration,
            Datastore::Operational => LogicalDatastore::Operational,
        }
    }

    /// Parse a datastore element name from a source/target clause
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "candidate" => Some(Datastore::Candidate),
            "running" => Some(Datastore::Running),
            "operational" => Some(Datastore::Operational),
            _ => None,
        }
    }

    /// The wire/display name of this view
    pub fn as_str(&self) -> &'static str {
        match self {
            Datastore::Candidate => "candidate",
            Datastore::Running => "running",
            Datastore::Operational => "operational",
        }
    }
}

impl std::fmt::Display for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
