mod artifact;
mod canonical;
mod change_log;
mod processed;
mod raw_dimension;
mod spine;
mod status;

pub use artifact::ArtifactRepository;
pub use canonical::CanonicalRepository;
pub use change_log::ChangeLogRepository;
pub use processed::ProcessedRepository;
pub use raw_dimension::RawDimensionRepository;
pub use spine::SpineRepository;
pub use status::StatusRepository;
