use std::path::Path;

use discovery_core::SessionState;
use discovery_engine::{MergeSummary, StoreStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub query: String,
    pub store: String,
    pub final_state: Option<SessionState>,
    pub iterations: u32,
    pub discovered: usize,
    pub written: usize,
    pub duplicates: usize,
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(query: String, store: &Path, iterations: u32, discovered: usize) -> Self {
        Self {
            query,
            store: store.display().to_string(),
            final_state: None,
            iterations,
            discovered,
            written: 0,
            duplicates: 0,
            error: None,
        }
    }

    pub fn merged(mut self, merge: MergeSummary) -> Self {
        self.written = merge.written;
        self.duplicates = merge.duplicates;
        self
    }

    /// Records a failed discovery and what became of its partial items.
    pub fn failed(
        mut self,
        discovery_error: String,
        partial_merge: Result<MergeSummary, String>,
    ) -> Self {
        let error = match partial_merge {
            Ok(merge) => {
                self = self.merged(merge);
                discovery_error
            }
            Err(merge_error) => {
                format!("{discovery_error}; partial items were not stored: {merge_error}")
            }
        };
        self.error = Some(error);
        self
    }

    pub fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        let state = self
            .final_state
            .map(|state| state.to_string())
            .unwrap_or_else(|| "FAILED".to_string());
        println!("query:      {}", self.query);
        println!("state:      {state} after {} iterations", self.iterations);
        println!("discovered: {}", self.discovered);
        println!("written:    {} ({} duplicates)", self.written, self.duplicates);
        println!("store:      {}", self.store);
        if let Some(error) = &self.error {
            println!("error:      {error}");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub store: String,
    pub total_rows: usize,
    pub queries: Vec<String>,
}

impl StatsReport {
    pub fn new(store: &Path, stats: StoreStats) -> Self {
        Self {
            store: store.display().to_string(),
            total_rows: stats.total_rows,
            queries: stats.queries,
        }
    }

    pub fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        println!("{}: {} rows", self.store, self.total_rows);
        for query in &self.queries {
            println!("  {query}");
        }
        Ok(())
    }
}
