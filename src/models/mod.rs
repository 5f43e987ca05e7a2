pub mod history;
pub mod report;
pub mod scan;

pub use history::HistoryEntry;
pub use report::ReportSubmission;
pub use scan::{Decision, ImageFile, ScanResult};
