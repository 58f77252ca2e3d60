use crate::types::{IntelligentSearchResponse, QueryIntent, ToolName};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One line of the audit log, written per search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub intent: QueryIntent,
    pub confidence: f64,
    pub recommended_tools: Vec<ToolName>,
    pub executed_tools: Vec<ToolName>,
    pub failed_tools: Vec<ToolName>,
}

impl AuditRecord {
    pub fn from_response(query: &str, response: &IntelligentSearchResponse) -> Self {
        let executed = response.executed_results.as_deref().unwrap_or_default();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            query: query.to_string(),
            intent: response.query_analysis.intent,
            confidence: response.query_analysis.confidence,
            recommended_tools: response
                .recommended_tools
                .iter()
                .map(|r| r.tool_name)
                .collect(),
            executed_tools: executed
                .iter()
                .filter(|r| !r.is_error())
                .map(|r| r.tool_name)
                .collect(),
            failed_tools: executed
                .iter()
                .filter(|r| r.is_error())
                .map(|r| r.tool_name)
                .collect(),
        }
    }
}

/// Append-only JSON-lines audit log
pub struct AuditLog {
    path: PathBuf,
    // Serializes appends so concurrent searches never interleave lines
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create audit log directory")?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(record).context("Failed to serialize audit record")?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open audit log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .context("Failed to write audit record")?;
        file.flush().await.context("Failed to flush audit log")?;
        Ok(())
    }

    pub async fn read_all(&self) -> Result<Vec<AuditRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to read audit log"),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("Failed to parse audit record"))
            .collect()
    }
}
