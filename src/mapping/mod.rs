mod line_mapper;
mod report;
mod similarity;

pub use line_mapper::{LineMapper, Provenance, ResolvedAnchor};
pub use report::line_mapping_report;
pub use similarity::similarity_ratio;
