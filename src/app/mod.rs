// Application layer - Use case interactors

pub mod batch;
pub mod container;
pub mod discover_interactor;
pub mod merge_interactor;
pub mod oracle;
pub mod repair_interactor;
pub mod scan_interactor;

// Re-export interactors
pub use discover_interactor::DiscoverInteractor;
pub use merge_interactor::MergeInteractor;
pub use oracle::DiagnosticOracle;
pub use repair_interactor::RepairInteractor;
pub use scan_interactor::ScanInteractor;
