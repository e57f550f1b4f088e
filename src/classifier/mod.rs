pub mod engine;
pub mod preprocess;

pub use engine::{argmax, ClassifierEngine, NUM_CLASSES};
pub use preprocess::{pack_input_tensor, CHANNELS, INPUT_LEN, INPUT_SIZE};
