pub mod labels;
pub mod model_metadata;
pub mod model_storage;

pub use labels::LabelTable;
pub use model_metadata::ModelMetadata;
pub use model_storage::{load_labels, load_metadata, load_model_binary, save_model_bundle};
