//! Newline-delimited producer for ensemble reports

use crate::types::assessment::EnsembleReport;
use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Producer writing one JSON `EnsembleReport` per line
pub struct ReportProducer<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> ReportProducer<W> {
    /// Create a new report producer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Publish a report
    pub async fn publish(&mut self, report: &EnsembleReport) -> Result<()> {
        let mut payload = serde_json::to_vec(report)?;
        payload.push(b'\n');

        self.writer.write_all(&payload).await?;

        debug!(
            report_id = %report.report_id,
            tier = ?report.agreement.tier,
            "Published ensemble report"
        );

        Ok(())
    }

    /// Flush buffered output
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
