//! Fibrosis stage classification: a ResNet-50 ONNX graph with a 5-way head,
//! loaded once at startup and shared read-only across requests.

use std::path::Path;

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::AppError;

/// Ordinal severity stages, in model output order.
pub const STAGES: [&str; 5] = ["F0", "F1", "F2", "F3", "F4"];

const INPUT_SIZE: usize = 224;
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Seam between the web layer and the network, so handler tests can run
/// without model weights on disk.
pub trait Classifier: Send + Sync + 'static {
    fn classify(&self, image_path: &Path) -> Result<&'static str, AppError>;
}

pub struct StageModel {
    plan: OnnxPlan,
}

impl StageModel {
    /// Loads the ONNX graph and pins its input to `f32 [1, 3, 224, 224]`.
    /// Fails if the file is missing or unparsable, or if the graph's output
    /// width does not match the stage table.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec![1, 3, INPUT_SIZE, INPUT_SIZE]),
            )?
            .into_optimized()?;

        let output = model.output_fact(0)?;
        let shape = output
            .shape
            .as_concrete()
            .ok_or_else(|| anyhow::anyhow!("model output shape is not static: {:?}", output))?;
        anyhow::ensure!(
            shape.last() == Some(&STAGES.len()),
            "model output shape {:?} does not match the {} fibrosis stages",
            shape,
            STAGES.len()
        );

        Ok(Self {
            plan: model.into_runnable()?,
        })
    }
}

impl Classifier for StageModel {
    fn classify(&self, image_path: &Path) -> Result<&'static str, AppError> {
        let input = preprocess(image_path)?;

        let tensor = tract_ndarray::Array4::from_shape_vec(
            (1, 3, INPUT_SIZE, INPUT_SIZE),
            input.into_raw_vec(),
        )
        .map_err(|e| AppError::Inference(e.to_string()))?
        .into_tensor();

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| AppError::Inference(e.to_string()))?;
        let scores = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| AppError::Inference(e.to_string()))?;

        Ok(STAGES[argmax(scores.iter().copied())])
    }
}

/// Decode, force RGB, stretch to 224x224, scale to [0,1], normalize per
/// channel, emit NCHW with a batch dimension of 1.
pub fn preprocess(path: &Path) -> Result<Array4<f32>, AppError> {
    // Stored names are server-generated and may carry no extension, so the
    // format has to come from the file content.
    let rgb = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgb8();
    let resized = image::imageops::resize(
        &rgb,
        INPUT_SIZE as u32,
        INPUT_SIZE as u32,
        FilterType::Triangle,
    );

    let mut tensor = Array4::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }
    Ok(tensor)
}

// Exact ties must resolve to the lowest index, so only a strictly greater
// score displaces the current best.
fn argmax(scores: impl IntoIterator<Item = f32>) -> usize {
    let mut best = 0;
    let mut best_score = f32::NEG_INFINITY;
    for (ix, score) in scores.into_iter().enumerate() {
        if score > best_score {
            best = ix;
            best_score = score;
        }
    }
    best
}
