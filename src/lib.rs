pub mod app;
pub mod logger;
pub mod shutdown;
pub mod streaming;
pub mod thermal_pipeline;
