use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("channel count must be at least one")]
    InvalidChannelCount,
    #[error("tick period must be a non-zero whole number of milliseconds")]
    InvalidTickPeriod,
    #[error("bundle for tick {tick} has {actual} channels, expected {expected}")]
    ChannelMismatch {
        tick: u64,
        expected: usize,
        actual: usize,
    },
    #[error("window `{name}` must hold at least one entry")]
    InvalidWindow { name: &'static str },
    #[error("simulator is already running")]
    AlreadyRunning,
    #[error("simulator is not running")]
    NotRunning,
    #[error("history store lock was poisoned by a panicking writer")]
    StatePoisoned,
    #[error("ticker thread panicked")]
    TickerPanicked,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Plot(value.to_string())
    }
}
impl<T> From<std::sync::PoisonError<T>> for ScopeError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        ScopeError::StatePoisoned
    }
}
