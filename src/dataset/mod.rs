//! Underwriting dataset model and loading

mod data;
pub mod loader;

pub use data::{Carrier, Dataset, DatasetMetadata, Metadata, Product, RateBand, RateTablePeriod};
pub use loader::{
    load_dataset_from_path, load_dataset_from_reader, load_dataset_from_str, load_dataset_from_url,
    DatasetSource,
};
