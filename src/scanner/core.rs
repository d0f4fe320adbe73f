use super::aggregate::aggregate;
use super::backend::{Backend, BackendPreference};
use super::delegate::DEFAULT_TIMEOUT;
use super::roots::resolve_roots;
use super::types::{ScanReport, ScanStats};
use crate::config::{ScanConfig, ScanSettings};
use crate::error::ScanError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How a scan is executed, as opposed to what it looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub backend: BackendPreference,
    pub delegate_timeout: Duration,
    pub delegate_programs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            delegate_timeout: DEFAULT_TIMEOUT,
            delegate_programs: vec!["fd".to_string(), "fdfind".to_string()],
        }
    }
}

impl From<&ScanSettings> for ScanOptions {
    fn from(settings: &ScanSettings) -> Self {
        Self {
            backend: settings.backend,
            delegate_timeout: settings.delegate_timeout(),
            delegate_programs: settings.delegate_programs.clone(),
        }
    }
}

/// File discovery engine
///
/// Resolves roots, picks a backend once, scans roots in declaration order and
/// aggregates. Scans never fail: degraded roots and subtrees end up in
/// [`ScanReport::diagnostics`].
#[derive(Debug, Clone)]
pub struct Scanner {
    config: Arc<ScanConfig>,
    options: ScanOptions,
}

impl Scanner {
    /// Rejects configurations with invalid bounds before any scanning happens
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            options: ScanOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn select_backend(&self) -> Backend {
        Backend::select(
            self.options.backend,
            &self.options.delegate_programs,
            self.options.delegate_timeout,
        )
    }

    pub async fn scan(&self) -> ScanReport {
        self.scan_with_cancel(CancellationToken::new()).await
    }

    /// Scan, giving up at `deadline` with whatever was found by then
    pub async fn scan_until(&self, deadline: tokio::time::Instant) -> ScanReport {
        let cancel = CancellationToken::new();
        let timer = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                cancel.cancel();
            })
        };

        let report = self.scan_with_cancel(cancel).await;
        timer.abort();
        report
    }

    /// Scan until done or until `cancel` fires; partial results are kept
    pub async fn scan_with_cancel(&self, cancel: CancellationToken) -> ScanReport {
        let start_time = Instant::now();
        let config = &self.config;

        let (roots, mut diagnostics) = resolve_roots(&config.roots);
        for dropped in &diagnostics {
            tracing::info!("{}", dropped);
        }

        let backend = self.select_backend();
        tracing::debug!(
            "Scanning {} of {} roots with the {} backend",
            roots.len(),
            config.roots.len(),
            backend.kind()
        );

        let output = backend.scan(&roots, Arc::clone(config), &cancel).await;
        diagnostics.extend(output.diagnostics);
        if output.cancelled {
            tracing::warn!("Scan cancelled, returning partial results");
            diagnostics.push(ScanError::Cancelled);
        }

        let raw_hits = output.per_root.iter().map(Vec::len).sum();
        let aggregated = aggregate(output.per_root, config.max_files);

        let stats = ScanStats {
            roots_configured: config.roots.len(),
            roots_resolved: roots.len(),
            roots_scanned: output.roots_scanned,
            raw_hits,
            scan_duration_ms: start_time.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Found {} files in {} roots ({} backend, {}ms, {} diagnostics)",
            aggregated.files.len(),
            stats.roots_scanned,
            backend.kind(),
            stats.scan_duration_ms,
            diagnostics.len()
        );

        ScanReport {
            files: aggregated.files,
            backend: backend.kind(),
            diagnostics,
            cancelled: output.cancelled,
            truncated: output.capped || aggregated.truncated,
            stats,
        }
    }
}
