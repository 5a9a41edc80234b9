mod processing;

pub use processing::{process_image, CONTENT_TYPE, MAX_EDGE, MAX_FILE_SIZE};
