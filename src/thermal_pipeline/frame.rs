//! Frame types flowing through the thermal pipeline

pub mod types;

pub use types::{
    Annotation, AnnotationKind, AnnotationRole, DisplayFrame, LayerStyle, MarkerPositions,
    PixelPos, RawFrame, MAX_RAW_VALUE,
};
