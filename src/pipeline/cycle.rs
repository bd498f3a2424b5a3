//! The three-stage monet -> photo -> monet style cycle.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{Error, Result};
use crate::image::{self, PixelBuffer, RGB_CHANNELS, STYLE_IMAGE_SIZE};
use crate::model::{ModelCache, ModelType};

use super::generator::{GeneratorHandle, OnnxGenerator};

/// Tensor shape both generators are exported with.
const GENERATOR_SHAPE: [usize; 4] = [
    1,
    STYLE_IMAGE_SIZE as usize,
    STYLE_IMAGE_SIZE as usize,
    RGB_CHANNELS,
];

/// Configuration for the style-transfer pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output JPEG quality (1-100).
    pub output_quality: u8,

    /// Directory holding the generator models. Defaults to the platform
    /// cache directory, downloading on first use.
    pub models_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_quality: 95,
            models_dir: None,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.output_quality) {
            return Err(Error::InvalidParameter {
                name: "output_quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        Ok(())
    }
}

/// Pipeline applying the cyclic Monet style transfer.
///
/// Owns both generator handles for its whole lifetime. `&mut self`
/// receivers keep invocations serialized; the underlying engines are
/// treated as non-reentrant. Callers wanting a responsive UI run the
/// pipeline on a worker thread.
pub struct Pipeline {
    config: Config,
    monet: GeneratorHandle,
    photo: GeneratorHandle,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration.
    ///
    /// This will download models if they are not already cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or either model
    /// cannot be loaded. A failed load releases any session acquired
    /// before it; the pipeline is never left partially initialized.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing pipeline with config: {config:?}");

        let cache = match &config.models_dir {
            Some(dir) => ModelCache::with_dir(dir.clone())?,
            None => ModelCache::new()?,
        };

        tracing::info!("Loading monet generator...");
        let monet = cache.load_session(ModelType::MonetGenerator)?;

        tracing::info!("Loading photo generator...");
        let photo = cache.load_session(ModelType::PhotoGenerator)?;

        tracing::info!("Pipeline initialized successfully");

        Ok(Self {
            config,
            monet: GeneratorHandle::new(
                "monet",
                Box::new(OnnxGenerator::new("monet", monet, GENERATOR_SHAPE)),
            ),
            photo: GeneratorHandle::new(
                "photo",
                Box::new(OnnxGenerator::new("photo", photo, GENERATOR_SHAPE)),
            ),
        })
    }

    /// Assemble a pipeline from already-constructed generator handles.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_generators(
        config: Config,
        monet: GeneratorHandle,
        photo: GeneratorHandle,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            monet,
            photo,
        })
    }

    /// Run one full style cycle over an input image.
    ///
    /// The input is resized to the generator resolution, translated into the
    /// Monet domain, reconstructed into the photo domain, and stylized a
    /// second time. Each stage re-marshals pixels through the tensor codec
    /// and is shape-checked against the generator contract; any failure
    /// aborts this call only, leaving the pipeline usable.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing, a shape check, or a generator
    /// invocation fails.
    pub fn run_cycle(&mut self, input: &PixelBuffer) -> Result<PixelBuffer> {
        let resized = codec::resize(input, STYLE_IMAGE_SIZE, STYLE_IMAGE_SIZE)?;
        let mut scratch = PixelBuffer::new(STYLE_IMAGE_SIZE, STYLE_IMAGE_SIZE);

        tracing::info!("Applying Monet style...");
        let styled = self.monet.invoke(&codec::encode(&resized))?;
        codec::decode_into(&styled, &mut scratch);

        tracing::info!("Translating back to the photo domain...");
        let reconstructed = self.photo.invoke(&codec::encode(&scratch))?;
        codec::decode_into(&reconstructed, &mut scratch);

        tracing::info!("Re-applying Monet style...");
        let restyled = self.monet.invoke(&codec::encode(&scratch))?;

        Ok(codec::decode(&restyled))
    }

    /// Process an image file end to end.
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input image
    /// * `output_path` - Path to save the stylized image
    ///
    /// # Errors
    ///
    /// Returns an error if loading, the style cycle, or saving fails.
    pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        tracing::info!("Processing image: {}", input_path.display());

        let input = image::load_image(input_path)?;
        let stylized = self.run_cycle(&input)?;

        tracing::info!("Saving output to: {}", output_path.display());
        image::save_image(&stylized, output_path, self.config.output_quality)?;

        tracing::info!("Processing complete");
        Ok(())
    }

    /// Release both generator handles.
    ///
    /// Each release is attempted independently; failures are aggregated
    /// rather than letting the first abort the second. Safe to call more
    /// than once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Release`] listing every handle that failed.
    pub fn close(&mut self) -> Result<()> {
        tracing::info!("Closing pipeline");

        let mut failures = Vec::new();

        if let Err(err) = self.monet.release() {
            failures.push(format!("{}: {err}", self.monet.name()));
        }
        if let Err(err) = self.photo.release() {
            failures.push(format!("{}: {err}", self.photo.name()));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Release { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageTensor;
    use crate::pipeline::InferenceEngine;
    use ndarray::Array4;
    use std::sync::{Arc, Mutex};

    struct RecordingEngine {
        name: &'static str,
        shape: [usize; 4],
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail_release: bool,
    }

    impl RecordingEngine {
        fn new(name: &'static str, calls: &Arc<Mutex<Vec<&'static str>>>) -> Self {
            Self {
                name,
                shape: GENERATOR_SHAPE,
                calls: Arc::clone(calls),
                fail_release: false,
            }
        }
    }

    impl InferenceEngine for RecordingEngine {
        fn input_shape(&self) -> [usize; 4] {
            self.shape
        }

        fn output_shape(&self) -> [usize; 4] {
            self.shape
        }

        fn invoke(&mut self, _input: &ImageTensor) -> Result<ImageTensor> {
            self.calls.lock().unwrap().push(self.name);
            Ok(Array4::from_elem(
                (self.shape[0], self.shape[1], self.shape[2], self.shape[3]),
                0.5,
            ))
        }

        fn release(&mut self) -> Result<()> {
            if self.fail_release {
                Err(Error::Inference {
                    name: self.name.to_string(),
                    source: "engine shutdown refused".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn mock_pipeline(calls: &Arc<Mutex<Vec<&'static str>>>) -> Pipeline {
        Pipeline::with_generators(
            Config::default(),
            GeneratorHandle::new("monet", Box::new(RecordingEngine::new("monet", calls))),
            GeneratorHandle::new("photo", Box::new(RecordingEngine::new("photo", calls))),
        )
        .unwrap()
    }

    #[test]
    fn test_cycle_invokes_monet_photo_monet() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = mock_pipeline(&calls);

        let input = PixelBuffer::new(64, 48);
        let output = pipeline.run_cycle(&input).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["monet", "photo", "monet"]);
        assert_eq!(output.width(), STYLE_IMAGE_SIZE);
        assert_eq!(output.height(), STYLE_IMAGE_SIZE);
        // 0.5 * 255 = 127.5, truncated per channel.
        assert_eq!(output.pixel(0, 0), 0x007F7F7F);
    }

    #[test]
    fn test_cycle_aborts_on_shape_mismatch_before_invoking() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut monet = RecordingEngine::new("monet", &calls);
        monet.shape = [1, 128, 128, 3];

        let mut pipeline = Pipeline::with_generators(
            Config::default(),
            GeneratorHandle::new("monet", Box::new(monet)),
            GeneratorHandle::new("photo", Box::new(RecordingEngine::new("photo", &calls))),
        )
        .unwrap();

        let err = pipeline.run_cycle(&PixelBuffer::new(4, 4)).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_close_is_idempotent() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = mock_pipeline(&calls);

        assert!(pipeline.close().is_ok());
        assert!(pipeline.close().is_ok());
    }

    #[test]
    fn test_close_attempts_both_releases_and_aggregates() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut monet = RecordingEngine::new("monet", &calls);
        monet.fail_release = true;
        let mut photo = RecordingEngine::new("photo", &calls);
        photo.fail_release = true;

        let mut pipeline = Pipeline::with_generators(
            Config::default(),
            GeneratorHandle::new("monet", Box::new(monet)),
            GeneratorHandle::new("photo", Box::new(photo)),
        )
        .unwrap();

        match pipeline.close().unwrap_err() {
            Error::Release { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(failures[0].starts_with("monet"));
                assert!(failures[1].starts_with("photo"));
            }
            other => panic!("expected Release, got {other:?}"),
        }

        // Engines were taken on the first attempt; a second close has
        // nothing left to release and reports success.
        assert!(pipeline.close().is_ok());
    }

    #[test]
    fn test_close_reports_partial_failure() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut monet = RecordingEngine::new("monet", &calls);
        monet.fail_release = true;

        let mut pipeline = Pipeline::with_generators(
            Config::default(),
            GeneratorHandle::new("monet", Box::new(monet)),
            GeneratorHandle::new("photo", Box::new(RecordingEngine::new("photo", &calls))),
        )
        .unwrap();

        match pipeline.close().unwrap_err() {
            Error::Release { failures } => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].starts_with("monet"));
            }
            other => panic!("expected Release, got {other:?}"),
        }
    }

    #[test]
    fn test_config_rejects_zero_quality() {
        let config = Config {
            output_quality: 0,
            ..Config::default()
        };

        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
