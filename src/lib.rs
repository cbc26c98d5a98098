//! Sector hierarchy and geometry streaming for CAD models.
//!
//! A model revision is published as a flat list of sectors. Each sector
//! carries a path such as `"0/1/"` that places it in a spatial tree, a
//! bounding box and several candidate geometry files in different format
//! versions. [`build_scene`] turns that list into a validated tree,
//! [`resolve_best_file`] picks the file to fetch per sector and the
//! [`SectorDataSource`] implementations hand out the raw bytes, either from
//! the remote 3D API ([`ApiSectorSource`]) or from exported static files
//! ([`LocalSectorSource`]).

pub mod hierarchy;
pub mod metadata;
pub mod prelude;
pub mod resource;
pub mod scene;
pub mod source;
pub mod transform;
pub mod version;

pub use hierarchy::{build_scene, parent_path, BuildSceneError, ROOT_PATH};
pub use metadata::{BoundingBox, RevisionMetadata, Sector, SectorPage, SimpleSummary, VersionedFile};
pub use scene::aabb::Aabb;
pub use scene::node::SectorMetadata;
pub use scene::{NodeId, SectorScene};
pub use source::api::{ApiSectorSource, ApiSourceConfig};
pub use source::local::{LocalSectorSource, LocalSourceConfig};
pub use source::{ModelMetadata, SectorDataSource, SectorSourceError};
pub use transform::{compose_transform, SectorModelTransformation, TransformError};
pub use version::{resolve_best_file, SUPPORTED_VERSIONS};
