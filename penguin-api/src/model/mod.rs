pub mod artifact;
pub mod classifier;
pub mod columns;
pub mod label_encoder;
pub mod predictor;
