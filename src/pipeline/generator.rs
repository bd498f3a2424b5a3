//! Generator handles and the inference engine capability they wrap.

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{Error, Result};
use crate::image::ImageTensor;

/// Opaque inference capability with fixed input and output shapes.
///
/// The pipeline depends only on this trait, so tests can substitute a
/// deterministic mock for the ONNX-backed implementation.
pub trait InferenceEngine: Send {
    /// Declared input shape, `[batch, height, width, channels]`.
    fn input_shape(&self) -> [usize; 4];

    /// Declared output shape.
    fn output_shape(&self) -> [usize; 4];

    /// Run one inference pass on a tensor matching the declared input shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying engine rejects or fails on the
    /// input.
    fn invoke(&mut self, input: &ImageTensor) -> Result<ImageTensor>;

    /// Release engine resources. Called exactly once, at handle teardown.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to shut down cleanly.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A named generator owned by the pipeline.
///
/// Every invocation is shape-checked against the engine's declared contract
/// on both sides of the boundary. The engine is taken out of the handle on
/// release, so a second release is a no-op and a post-release invocation is
/// a reported error rather than a use-after-free hazard.
pub struct GeneratorHandle {
    name: String,
    engine: Option<Box<dyn InferenceEngine>>,
}

impl GeneratorHandle {
    /// Wrap an engine under a generator name.
    pub fn new(name: impl Into<String>, engine: Box<dyn InferenceEngine>) -> Self {
        Self {
            name: name.into(),
            engine: Some(engine),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared input shape, or `None` once released.
    #[must_use]
    pub fn input_shape(&self) -> Option<[usize; 4]> {
        self.engine.as_ref().map(|e| e.input_shape())
    }

    /// Invoke the generator on a tensor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if the tensor disagrees with the
    /// engine's declared input shape, or if the engine produces output of an
    /// undeclared shape; [`Error::Inference`] if the engine itself fails or
    /// the handle has already been released.
    pub fn invoke(&mut self, input: &ImageTensor) -> Result<ImageTensor> {
        let engine = self.engine.as_mut().ok_or_else(|| Error::Inference {
            name: self.name.clone(),
            source: "generator handle already released".into(),
        })?;

        let expected = engine.input_shape();
        if input.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{expected:?}"),
                actual: format!("{:?}", input.shape()),
            });
        }

        tracing::debug!("Running generator {}", self.name);
        let output = engine.invoke(input)?;

        let declared = engine.output_shape();
        if output.shape() != declared {
            return Err(Error::ShapeMismatch {
                expected: format!("{declared:?}"),
                actual: format!("{:?}", output.shape()),
            });
        }

        Ok(output)
    }

    /// Release the wrapped engine. Safe to call repeatedly; only the first
    /// call reaches the engine.
    ///
    /// # Errors
    ///
    /// Propagates the engine's release failure.
    pub fn release(&mut self) -> Result<()> {
        match self.engine.take() {
            Some(mut engine) => engine.release(),
            None => Ok(()),
        }
    }
}

/// ONNX Runtime-backed generator engine.
pub struct OnnxGenerator {
    name: String,
    session: Session,
    shape: [usize; 4],
}

impl OnnxGenerator {
    /// Bind a session to the fixed tensor shape it was exported with.
    pub fn new(name: impl Into<String>, session: Session, shape: [usize; 4]) -> Self {
        Self {
            name: name.into(),
            session,
            shape,
        }
    }

    fn inference_error(&self, source: ort::Error) -> Error {
        Error::Inference {
            name: self.name.clone(),
            source: Box::new(source),
        }
    }
}

impl InferenceEngine for OnnxGenerator {
    fn input_shape(&self) -> [usize; 4] {
        self.shape
    }

    fn output_shape(&self) -> [usize; 4] {
        self.shape
    }

    fn invoke(&mut self, input: &ImageTensor) -> Result<ImageTensor> {
        let input_value =
            Tensor::from_array(input.clone()).map_err(|source| self.inference_error(source))?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference {
                name: self.name.clone(),
                source: Box::new(source),
            })?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "stylized image output".to_string(),
                actual: "no output".to_string(),
            })?;

        let (shape_info, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|source| Error::Inference {
                name: self.name.clone(),
                source: Box::new(source),
            })?;

        // Safe: tensor dimensions are always non-negative and within bounds
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let dims: Vec<usize> = shape_info.iter().map(|&x| x as usize).collect();

        if dims.len() != 4 {
            return Err(Error::ShapeMismatch {
                expected: "4D tensor".to_string(),
                actual: format!("{}D tensor", dims.len()),
            });
        }

        Array4::from_shape_vec((dims[0], dims[1], dims[2], dims[3]), data.to_vec()).map_err(|_| {
            Error::ShapeMismatch {
                expected: format!("{dims:?}"),
                actual: "reshape failed".to_string(),
            }
        })
    }
}
