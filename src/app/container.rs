use std::path::Path;
use std::sync::Arc;

use crate::adapters::{
    FfmpegToolAdapter, FfprobeAdapter, JsonProgressRegistry, Settings, TracingLogAdapter,
};
use crate::app::{
    repair_interactor::RepairConfig, DiagnosticOracle, DiscoverInteractor, MergeInteractor,
    RepairInteractor, ScanInteractor,
};
use crate::domain::errors::DomainError;
use crate::ports::{LogPort, ProbePort, ProgressPort, ToolPort};

pub trait AppContainer: Send + Sync {
    fn oracle(&self) -> Arc<DiagnosticOracle>;
    fn scan_interactor(&self) -> Arc<ScanInteractor>;
    fn discover_interactor(&self) -> Arc<DiscoverInteractor>;
    fn merge_interactor(&self) -> Arc<MergeInteractor>;
    /// Repair interactor writing into `output_dir`
    fn repair_interactor(&self, output_dir: &Path) -> Arc<RepairInteractor>;
    fn log(&self) -> Arc<dyn LogPort>;
}

pub struct DefaultAppContainer {
    settings: Settings,
    tool_port: Arc<dyn ToolPort>,
    log_port: Arc<dyn LogPort>,
    oracle: Arc<DiagnosticOracle>,
    scan_interactor: Arc<ScanInteractor>,
    discover_interactor: Arc<DiscoverInteractor>,
    merge_interactor: Arc<MergeInteractor>,
}

impl DefaultAppContainer {
    /// Wire the production adapters
    pub fn new(settings: Settings) -> Result<Self, DomainError> {
        let tool_port: Arc<dyn ToolPort> = Arc::new(FfmpegToolAdapter::new());
        let probe_port: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(
            Arc::clone(&tool_port),
            settings.tools.ffprobe.clone(),
        ));
        let registry: Arc<dyn ProgressPort> =
            Arc::new(JsonProgressRegistry::load(&settings.registry_file)?);
        let log_port: Arc<dyn LogPort> = Arc::new(TracingLogAdapter::new());

        Ok(Self::with_ports(
            settings, tool_port, probe_port, registry, log_port,
        ))
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        settings: Settings,
        tool_port: Arc<dyn ToolPort>,
        probe_port: Arc<dyn ProbePort>,
        registry: Arc<dyn ProgressPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        let oracle = Arc::new(DiagnosticOracle::new(
            Arc::clone(&tool_port),
            settings.tools.ffmpeg.clone(),
        ));

        let scan_interactor = Arc::new(ScanInteractor::new(Arc::clone(&oracle), registry));
        let discover_interactor = Arc::new(DiscoverInteractor::new(Arc::clone(&oracle)));
        let merge_interactor = Arc::new(MergeInteractor::new(
            Arc::clone(&tool_port),
            probe_port,
            Arc::clone(&oracle),
            settings.tools.ffmpeg.clone(),
            settings.encode.clone(),
        ));

        Self {
            settings,
            tool_port,
            log_port,
            oracle,
            scan_interactor,
            discover_interactor,
            merge_interactor,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl AppContainer for DefaultAppContainer {
    fn oracle(&self) -> Arc<DiagnosticOracle> {
        Arc::clone(&self.oracle)
    }

    fn scan_interactor(&self) -> Arc<ScanInteractor> {
        Arc::clone(&self.scan_interactor)
    }

    fn discover_interactor(&self) -> Arc<DiscoverInteractor> {
        Arc::clone(&self.discover_interactor)
    }

    fn merge_interactor(&self) -> Arc<MergeInteractor> {
        Arc::clone(&self.merge_interactor)
    }

    fn repair_interactor(&self, output_dir: &Path) -> Arc<RepairInteractor> {
        Arc::new(RepairInteractor::new(
            Arc::clone(&self.tool_port),
            Arc::clone(&self.oracle),
            RepairConfig {
                output_dir: output_dir.to_path_buf(),
                ffmpeg: self.settings.tools.ffmpeg.clone(),
                profile: self.settings.encode.clone(),
                extract_streams: self.settings.repair.extract_streams,
            },
        ))
    }

    fn log(&self) -> Arc<dyn LogPort> {
        Arc::clone(&self.log_port)
    }
}
