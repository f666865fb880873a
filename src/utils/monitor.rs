use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
}

/// 記錄每個階段的耗時；啟用時另外取樣行程記憶體與 CPU
pub struct RunMonitor {
    started: Instant,
    stage_started: Instant,
    stages: Vec<(String, Duration)>,
    #[cfg(feature = "cli")]
    sampler: Option<ProcessSampler>,
}

#[cfg(feature = "cli")]
struct ProcessSampler {
    system: Mutex<System>,
    pid: Pid,
    peak_memory_mb: Mutex<u64>,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn new() -> Option<Self> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut system = System::new();
        system.refresh_all();
        Some(Self {
            system: Mutex::new(system),
            pid,
            peak_memory_mb: Mutex::new(0),
        })
    }

    fn sample(&self) -> Option<ProcessSample> {
        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let process = system.process(self.pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory_mb.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(ProcessSample {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            peak_memory_mb: *peak,
        })
    }
}

impl RunMonitor {
    pub fn new(sample_process: bool) -> Self {
        #[cfg(not(feature = "cli"))]
        if sample_process {
            tracing::warn!("Process sampling requires the `cli` feature; timing only");
        }

        let now = Instant::now();
        Self {
            started: now,
            stage_started: now,
            stages: Vec::new(),
            #[cfg(feature = "cli")]
            sampler: if sample_process {
                ProcessSampler::new()
            } else {
                None
            },
        }
    }

    pub fn is_sampling(&self) -> bool {
        #[cfg(feature = "cli")]
        {
            self.sampler.is_some()
        }
        #[cfg(not(feature = "cli"))]
        {
            false
        }
    }

    pub fn sample(&self) -> Option<ProcessSample> {
        #[cfg(feature = "cli")]
        {
            self.sampler.as_ref().and_then(ProcessSampler::sample)
        }
        #[cfg(not(feature = "cli"))]
        {
            None
        }
    }

    /// 結束目前階段並記錄耗時
    pub fn finish_stage(&mut self, stage: &str) -> Duration {
        let elapsed = self.stage_started.elapsed();
        self.stage_started = Instant::now();
        self.stages.push((stage.to_string(), elapsed));

        match self.sample() {
            Some(sample) => tracing::info!(
                "📊 {} took {:?} (CPU {:.1}%, memory {}MB, peak {}MB)",
                stage,
                elapsed,
                sample.cpu_usage,
                sample.memory_mb,
                sample.peak_memory_mb
            ),
            None => tracing::debug!("⏱️ {} took {:?}", stage, elapsed),
        }

        elapsed
    }

    pub fn stages(&self) -> &[(String, Duration)] {
        &self.stages
    }

    pub fn total_elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn log_final_stats(&self) {
        let peak = self.sample().map(|s| s.peak_memory_mb);
        match peak {
            Some(peak) => tracing::info!(
                "📊 Run finished in {:?}, peak memory {}MB",
                self.total_elapsed(),
                peak
            ),
            None => tracing::info!("⏱️ Run finished in {:?}", self.total_elapsed()),
        }
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
