pub mod history;
pub mod report;
pub mod scan;

pub use history::HistoryClient;
pub use report::ReportClient;
pub use scan::ScanClient;
