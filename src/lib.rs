//! # cyclestyle
//!
//! A library for applying cycle-consistent GAN style transfer to photos.
//!
//! An input image is translated into the Monet domain, reconstructed back
//! into the photo domain, and stylized a second time -- the three-pass usage
//! pattern the generator pair was trained for. The heavy lifting is tensor
//! marshalling: packed RGB pixels are normalized into `[1, 256, 256, 3]`
//! float tensors, run through two ONNX generator sessions, and unpacked
//! again between every stage.
//!
//! ## Example
//!
//! ```no_run
//! use cyclestyle::{Config, Pipeline};
//!
//! # fn main() -> cyclestyle::Result<()> {
//! let config = Config::default();
//! let mut pipeline = Pipeline::new(config)?;
//!
//! pipeline.process("photo.png", "monet.png")?;
//! pipeline.close()?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;

pub use error::{Error, Result};
pub use image::PixelBuffer;
pub use pipeline::{Config, GeneratorHandle, InferenceEngine, Pipeline};
