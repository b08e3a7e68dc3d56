pub mod access_log;
pub mod resident;
pub mod visitor;

pub use access_log::{AccessLogRepository, SqliteAccessLogRepository};
pub use resident::{ResidentRepository, SqliteResidentRepository};
pub use visitor::{SqliteVisitorRepository, VisitorRepository};
