pub mod catalogue;
pub mod metadata;
pub mod recommendations;
pub mod scan;
pub mod similarity;

pub use catalogue::Catalogue;
pub use metadata::{CatalogueMetadataProvider, MetadataProvider};
pub use recommendations::{Recommender, DEFAULT_K};
pub use scan::{BatchedScan, ScanStrategy};
pub use similarity::SimilarityMatrix;
