/// Tables keyed by (node, unix_time) that the existence check can inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTable {
    RawSample,
    HourlyAggregate,
}

impl SampleTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::RawSample => "raw_sample",
            Self::HourlyAggregate => "hourly_aggregate",
        }
    }
}
