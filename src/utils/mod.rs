use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::from_default_env().add_directive(
            "spendlog_core=info"
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into()),
        );

        // A host application may already own the global subscriber.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Divides `numerator` by `denominator`, returning `0.0` whenever the result
/// would not be finite (zero, negative-zero or NaN denominators included).
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Like [`safe_ratio`] but clamps the result into `[0.0, 1.0]`.
pub fn clamped_ratio(numerator: f64, denominator: f64) -> f64 {
    safe_ratio(numerator, denominator).clamp(0.0, 1.0)
}
