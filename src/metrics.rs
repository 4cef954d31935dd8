use std::sync::LazyLock;

use prometheus::*;

use crate::intake::RejectionReason;

static METRIC_REJECTION_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("damage_lens_rejection_count", "count of the rejected uploads", &["reason"])
        .unwrap()
});

static METRIC_ANALYSIS_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("damage_lens_analysis_count", "count of the analysis requests", &["outcome"])
        .unwrap()
});

static METRIC_ANALYSIS_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "damage_lens_analysis_duration",
        "duration of the analysis requests in seconds",
        &["outcome"]
    )
    .unwrap()
});

/// 增加被拒绝的上传计数
pub fn inc_rejection(reason: &RejectionReason) {
    let reason = match reason {
        RejectionReason::NotAnImage { .. } => "not_an_image",
        RejectionReason::TooLarge { .. } => "too_large",
    };
    METRIC_REJECTION_COUNT.with_label_values(&[reason]).inc();
}

/// 记录一次分析请求
pub fn inc_analysis(outcome: &str, duration: f64) {
    METRIC_ANALYSIS_COUNT.with_label_values(&[outcome]).inc();
    METRIC_ANALYSIS_DURATION.with_label_values(&[outcome]).observe(duration);
}

/// 以文本格式导出所有指标
pub fn gather_text() -> String {
    TextEncoder::new().encode_to_string(&prometheus::gather()).unwrap_or_default()
}
