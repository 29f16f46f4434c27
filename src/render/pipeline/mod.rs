//! Render pipelines

pub mod city;

pub use city::{CityPipeline, CubeVertex, DepthTexture, DEPTH_FORMAT};
