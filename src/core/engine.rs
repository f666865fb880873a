use crate::domain::model::{AggregatedReport, Briefing, DegradeReason, RunOutcome, RunState};
use crate::domain::ports::Pipeline;
use crate::utils::error::{DigestError, Result};
use crate::utils::monitor::RunMonitor;

/// 依序執行 收集 → 摘要 → 渲染發布。
/// 收集或摘要失敗時改用佔位文字；只有寫檔失敗會回傳錯誤。
pub struct DigestEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> DigestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        let mut monitor = RunMonitor::new(self.monitor_enabled);
        let mut states = Vec::with_capacity(4);

        enter(&mut states, RunState::Fetching);
        let report = match self.pipeline.collect().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("❌ Collection failed: {}", e);
                AggregatedReport::default()
            }
        };
        monitor.finish_stage(&RunState::Fetching.to_string());

        let briefing = if report.is_empty() {
            tracing::warn!("⚠️ No feed produced any entries, publishing placeholder");
            self.placeholder(DegradeReason::NoFeedContent)
        } else {
            enter(&mut states, RunState::Summarizing);
            let briefing = match self.pipeline.summarize(&report).await {
                Ok(markdown) => Briefing::generated(markdown),
                Err(e @ DigestError::MissingCredentialError { .. }) => {
                    tracing::error!("❌ {}", e);
                    tracing::error!("💡 {}", e.recovery_suggestion());
                    self.placeholder(DegradeReason::MissingCredential)
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Summarization failed: {} (Category: {:?})",
                        e,
                        e.category()
                    );
                    self.placeholder(DegradeReason::SummarizerFailed(e.to_string()))
                }
            };
            monitor.finish_stage(&RunState::Summarizing.to_string());
            briefing
        };

        enter(&mut states, RunState::Rendering);
        let page = self.pipeline.publish(&briefing).await?;
        monitor.finish_stage(&RunState::Rendering.to_string());

        enter(&mut states, RunState::Done);
        monitor.log_final_stats();

        Ok(RunOutcome {
            page,
            degraded: briefing.degraded,
            entries_collected: report.entry_count(),
            sources_failed: report.failed_sources(),
            states,
        })
    }

    fn placeholder(&self, reason: DegradeReason) -> Briefing {
        Briefing::placeholder(self.pipeline.placeholder_text(&reason), reason)
    }
}

fn enter(states: &mut Vec<RunState>, state: RunState) {
    tracing::debug!("State → {}", state);
    states.push(state);
}
