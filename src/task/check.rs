use crate::formatter::report::format_problems;
use crate::index::check::find_problems;
use crate::model::output::ProblemReport;
use crate::task::Task;
use crate::AppState;
use anyhow::anyhow;
use tracing::{info, warn};

/// Runs the consistency check over the current index and publishes the
/// text and JSON reports.
pub struct CheckConsistencyTask {
    app_state: AppState,
}

impl CheckConsistencyTask {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }
}

impl Task for CheckConsistencyTask {
    fn name(&self) -> &str {
        "Check Forward/Reverse Consistency"
    }

    fn run(&self) -> anyhow::Result<()> {
        let index = self.app_state.current_index()?;

        let problems = find_problems(&index);

        for problem in &problems {
            warn!("{:?}", problem);
        }

        let text = format_problems(&index, &problems);
        let count = problems.len();

        let report = ProblemReport {
            build_time: index.built_at.to_rfc3339(),
            check_time: chrono::Utc::now().to_rfc3339(),
            counts: count as u64,
            known_domains: index.known_domains.iter().cloned().collect(),
            failures: index.failures.clone(),
            problems,
        };

        let json = serde_json::to_string_pretty(&report)?;

        let mut data_lock = self
            .app_state
            .report
            .write()
            .map_err(|_| anyhow!("Report lock poisoned"))?;

        data_lock.last_updated = std::time::SystemTime::now();
        data_lock.text_content = text;
        data_lock.json_content = json;

        info!("Published report with {} problems.", count);

        Ok(())
    }
}
