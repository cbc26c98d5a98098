pub use crate::scene::aabb::Aabb;
pub use crate::scene::node::SectorMetadata;
pub use crate::scene::SectorScene;
pub use crate::source::api::{ApiSectorSource, ApiSourceConfig};
pub use crate::source::local::LocalSectorSource;
pub use crate::source::{ModelMetadata, SectorDataSource};
pub use crate::transform::SectorModelTransformation;

// Error types
pub use crate::hierarchy::BuildSceneError;
pub use crate::resource::ResourceError;
pub use crate::source::SectorSourceError;
pub use crate::transform::TransformError;
