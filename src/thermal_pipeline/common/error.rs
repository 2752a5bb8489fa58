use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Invalid frame dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Frame data length {actual} does not match {width}x{height}")]
    DataLengthMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Invalid scale factor: {0}")]
    InvalidScale(f32),

    #[error("Unsupported colormap id: {0}")]
    UnsupportedColormap(i32),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to encode JPEG image: {0}")]
    Jpeg(String),

    #[error("Frame buffer does not match {0}x{1} RGB layout")]
    BufferLayout(u32, u32),
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera is not open")]
    NotOpen,

    #[error("Failed to open camera: {0}")]
    OpenFailed(String),

    #[error("Camera stream ended")]
    EndOfStream,

    #[error("Camera read failed: {0}")]
    ReadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
