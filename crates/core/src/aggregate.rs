use crate::{HOUR_SECONDS, RawSample};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostPoint {
    pub unix_time: i64,
    pub cmg: f64,
}

impl From<&RawSample> for CostPoint {
    fn from(sample: &RawSample) -> Self {
        Self {
            unix_time: sample.unix_time,
            cmg: sample.cmg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("sample at {unix_time} is outside the hour starting at {hour_start}")]
    OutsideHour { hour_start: i64, unix_time: i64 },
    #[error("sample at {unix_time} is earlier than the sample before it")]
    Unordered { unix_time: i64 },
}

/// Duration-weighted mean of the step function described by `points` over
/// `[hour_start, hour_start + 3600)`.
///
/// Each point holds from its own offset until the next point's offset; the
/// last one holds until the end of the hour. Time before the first point
/// carries no weight. Returns `Ok(None)` when there are no points, so callers
/// never persist a zero for an empty hour.
pub fn weighted_hourly_average(
    points: &[CostPoint],
    hour_start: i64,
) -> Result<Option<f64>, AggregateError> {
    if points.is_empty() {
        return Ok(None);
    }
    let mut offsets = Vec::with_capacity(points.len());
    for point in points {
        let offset = point.unix_time - hour_start;
        if !(0..HOUR_SECONDS).contains(&offset) {
            return Err(AggregateError::OutsideHour {
                hour_start,
                unix_time: point.unix_time,
            });
        }
        if offsets.last().is_some_and(|prev| offset < *prev) {
            return Err(AggregateError::Unordered {
                unix_time: point.unix_time,
            });
        }
        offsets.push(offset);
    }

    let total: f64 = points
        .iter()
        .zip(&offsets)
        .enumerate()
        .map(|(idx, (point, offset))| {
            let until = offsets.get(idx + 1).copied().unwrap_or(HOUR_SECONDS);
            let weight = (until - offset) as f64 / HOUR_SECONDS as f64;
            weight * point.cmg
        })
        .sum();
    Ok(Some(total))
}
