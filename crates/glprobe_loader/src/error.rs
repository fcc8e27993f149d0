use thiserror::Error;

/// Failures raised while opening a library or binding its entry points.
///
/// Both are permanent for the lifetime of the process; nothing retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("dlopen failed for every candidate ({})", .tried.join(", "))]
    Open { tried: Vec<String> },

    #[error("{library}: symbol {symbol} not found")]
    Symbol { library: String, symbol: String },
}
