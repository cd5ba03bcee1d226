//! Prometheus-compatible counters for the voca server.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use voca_core::{SkillOrigin, SkillResult};

#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    http_requests_total: AtomicU64,
    /// 4xx + 5xx.
    http_errors_total: AtomicU64,
    skills_cached_total: AtomicU64,
    skills_created_total: AtomicU64,
    skills_race_lost_total: AtomicU64,
    images_succeeded_total: AtomicU64,
    images_failed_total: AtomicU64,
    translation_questions_total: AtomicU64,
    translation_evaluations_total: AtomicU64,
    translation_failures_total: AtomicU64,
    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                http_requests_total: AtomicU64::new(0),
                http_errors_total: AtomicU64::new(0),
                skills_cached_total: AtomicU64::new(0),
                skills_created_total: AtomicU64::new(0),
                skills_race_lost_total: AtomicU64::new(0),
                images_succeeded_total: AtomicU64::new(0),
                images_failed_total: AtomicU64::new(0),
                translation_questions_total: AtomicU64::new(0),
                translation_evaluations_total: AtomicU64::new(0),
                translation_failures_total: AtomicU64::new(0),
                started_at: Instant::now(),
            }),
        }
    }

    pub fn inc_http_requests(&self) {
        self.inner.http_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_http_errors(&self) {
        self.inner.http_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished generation by origin. Image outcomes are only
    /// counted for newly created skills; cached reads render nothing.
    pub fn record_skill(&self, result: &SkillResult) {
        let m = &self.inner;
        match result.origin {
            SkillOrigin::Cached => {
                m.skills_cached_total.fetch_add(1, Ordering::Relaxed);
            }
            SkillOrigin::RaceLost => {
                m.skills_race_lost_total.fetch_add(1, Ordering::Relaxed);
            }
            SkillOrigin::Created => {
                m.skills_created_total.fetch_add(1, Ordering::Relaxed);
                if result.is_success() {
                    m.images_succeeded_total.fetch_add(1, Ordering::Relaxed);
                } else {
                    m.images_failed_total.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    pub fn inc_translation_questions(&self) {
        self.inner
            .translation_questions_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_translation_evaluations(&self) {
        self.inner
            .translation_evaluations_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_translation_failures(&self) {
        self.inner
            .translation_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }

    /// Render all counters in the Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let m = &self.inner;
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);

        format!(
            r#"# HELP voca_uptime_seconds Time since the server started.
# TYPE voca_uptime_seconds gauge
voca_uptime_seconds {}

# HELP voca_http_requests_total Total HTTP requests served.
# TYPE voca_http_requests_total counter
voca_http_requests_total {}

# HELP voca_http_errors_total Total HTTP errors (4xx/5xx).
# TYPE voca_http_errors_total counter
voca_http_errors_total {}

# HELP voca_skills_total Skill generation results by origin.
# TYPE voca_skills_total counter
voca_skills_total{{origin="cached"}} {}
voca_skills_total{{origin="created"}} {}
voca_skills_total{{origin="race_lost"}} {}

# HELP voca_images_total Image generation outcomes for new skills.
# TYPE voca_images_total counter
voca_images_total{{status="success"}} {}
voca_images_total{{status="failed"}} {}

# HELP voca_translation_calls_total Translation practice calls by kind.
# TYPE voca_translation_calls_total counter
voca_translation_calls_total{{kind="question"}} {}
voca_translation_calls_total{{kind="evaluate"}} {}

# HELP voca_translation_failures_total Translation calls answered with success=false.
# TYPE voca_translation_failures_total counter
voca_translation_failures_total {}
"#,
            self.uptime_secs(),
            load(&m.http_requests_total),
            load(&m.http_errors_total),
            load(&m.skills_cached_total),
            load(&m.skills_created_total),
            load(&m.skills_race_lost_total),
            load(&m.images_succeeded_total),
            load(&m.images_failed_total),
            load(&m.translation_questions_total),
            load(&m.translation_evaluations_total),
            load(&m.translation_failures_total),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
