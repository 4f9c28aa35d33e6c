//! Shared domain types for the WDS ingestion and dimension-harmonization pipeline.
//!
//! These are plain data records with no behavior beyond construction helpers; the
//! transforms that act on them (fetching, hashing, consensus selection) live in the
//! crates that own each stage (`wds-client`, `wds-db`, `wds-registry-builder`, ...).

pub mod artifact;
pub mod dimension;
pub mod ids;
pub mod spine;
pub mod unknown;

pub use artifact::{ArtifactFamily, ArtifactKey, ArtifactRecord, ArtifactStatus, ChangeLogEntry};
pub use dimension::{
    CanonicalDimension, CanonicalMember, ProcessedDimension, ProcessedMember, RawDimension,
    RawMember,
};
pub use ids::{Hash12, ProductId};
pub use spine::{Cube, CubeSubjectLink, CubeSurveyLink};
pub use unknown::UnknownFields;
