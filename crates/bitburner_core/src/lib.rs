pub mod augmentations;
pub mod codec;
pub mod container;
pub mod core_api;
pub mod derived;
pub mod model;
pub mod sections;
pub mod serializer;
pub mod stats;
pub mod transport;

pub use codec::TaggedValue;
pub use container::{RawContainer, SectionName};
pub use model::{LoadedSave, SaveModel, parse};
pub use serializer::serialize;
pub use transport::Transport;
