//! Image preparation and remote transformation.

mod prepare;
mod provider;
pub mod providers;
mod types;

pub use prepare::{prepare_input, square_crop_box, CropBox, PreparedImage};
pub use provider::ImageProvider;
pub use types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, HarmBlockThreshold, HarmCategory,
    ImageFormat, ImageProviderKind, SafetySetting,
};
