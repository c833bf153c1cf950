use anyhow::Context;
use serde::Deserialize;
use stakepulse_core::error::AnalyzeError;
use stakepulse_core::service::AnalysisService;
use std::io::BufRead;

const DEFAULT_STAKEHOLDER: &str = "general";

/// One JSON line of batch input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchItem {
    pub text: String,
    #[serde(default)]
    pub stakeholder_type: Option<String>,
}

impl BatchItem {
    pub fn stakeholder(&self) -> &str {
        self.stakeholder_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STAKEHOLDER)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub analyzed: usize,
    pub skipped: usize,
}

pub fn read_items(reader: impl BufRead) -> anyhow::Result<Vec<BatchItem>> {
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read input line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let item = serde_json::from_str::<BatchItem>(line)
            .with_context(|| format!("input line {line_no} is not a valid batch item: {line}"))?;
        out.push(item);
    }
    Ok(out)
}

/// Analyzes every item in order. Blank texts are skipped; any other failure aborts the run.
pub async fn run_batch(
    service: &AnalysisService,
    items: &[BatchItem],
) -> anyhow::Result<BatchReport> {
    let mut report = BatchReport::default();
    for (idx, item) in items.iter().enumerate() {
        match service.analyze(&item.text, item.stakeholder()).await {
            Ok(_) => report.analyzed += 1,
            Err(AnalyzeError::EmptyInput(_)) => {
                tracing::warn!(item = idx + 1, "skipping blank text");
                report.skipped += 1;
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("item {} failed", idx + 1)));
            }
        }
    }
    Ok(report)
}
