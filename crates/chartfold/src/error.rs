use crate::types::ChartId;
use chartfold_render::GraphicsError;

/// Errors surfaced to the controller as [`Event::Error`](crate::Event::Error).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A chart command arrived before `init`.
    NotInitialized,
    /// GPU support is missing or the device was lost. The engine stops
    /// serving commands until it is initialized again.
    Fatal(String),
    UnknownChart(ChartId),
    DuplicateChart(ChartId),
    /// A series in an update was malformed; the update was not applied.
    InvalidSeries {
        chart: ChartId,
        series: usize,
        reason: String,
    },
    /// A resource would exceed a device limit; the operation was not applied.
    LimitExceeded {
        chart: ChartId,
        resource: &'static str,
        requested: u64,
        limit: u64,
    },
    Graphics(GraphicsError),
    Unsupported(&'static str),
}

impl EngineError {
    /// Whether the error leaves the whole engine unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Fatal(_))
    }

    /// The chart the error is scoped to, if any.
    pub fn chart(&self) -> Option<ChartId> {
        match self {
            EngineError::UnknownChart(id) | EngineError::DuplicateChart(id) => Some(*id),
            EngineError::InvalidSeries { chart, .. } | EngineError::LimitExceeded { chart, .. } => {
                Some(*chart)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotInitialized => write!(f, "Engine is not initialized"),
            EngineError::Fatal(msg) => write!(f, "Fatal engine error: {}", msg),
            EngineError::UnknownChart(id) => write!(f, "Unknown chart {}", id),
            EngineError::DuplicateChart(id) => write!(f, "Chart {} is already registered", id),
            EngineError::InvalidSeries {
                chart,
                series,
                reason,
            } => write!(f, "Invalid series {} for chart {}: {}", series, chart, reason),
            EngineError::LimitExceeded {
                chart,
                resource,
                requested,
                limit,
            } => write!(
                f,
                "Chart {} {} of {} exceeds the device limit of {}",
                chart, resource, requested, limit
            ),
            EngineError::Graphics(err) => write!(f, "Graphics error: {}", err),
            EngineError::Unsupported(what) => write!(f, "Unsupported: {}", what),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Graphics(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphicsError> for EngineError {
    fn from(err: GraphicsError) -> Self {
        match err {
            GraphicsError::NoAdapter | GraphicsError::DeviceCreation(_) => {
                EngineError::Fatal(err.to_string())
            }
            other => EngineError::Graphics(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_errors_are_fatal() {
        assert!(EngineError::from(GraphicsError::NoAdapter).is_fatal());
        assert!(!EngineError::from(GraphicsError::SurfaceUnsupported).is_fatal());
    }

    #[test]
    fn test_chart_scope() {
        let err = EngineError::InvalidSeries {
            chart: ChartId(3),
            series: 1,
            reason: "length mismatch".into(),
        };
        assert_eq!(err.chart(), Some(ChartId(3)));
        assert_eq!(
            err.to_string(),
            "Invalid series 1 for chart 3: length mismatch"
        );
        assert_eq!(EngineError::NotInitialized.chart(), None);
    }
}
