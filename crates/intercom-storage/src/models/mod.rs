pub mod access_log;
pub mod resident;
pub mod visitor;

pub use access_log::AccessLog;
pub use resident::Resident;
pub use visitor::Visitor;
