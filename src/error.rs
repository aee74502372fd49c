use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transform is not invertible (determinant {determinant})")]
    DegenerateTransform { determinant: f64 },
    #[error("Surface size {width}x{height} exceeds the limit of {limit} pixels per side")]
    SurfaceTooLarge { width: u32, height: u32, limit: u32 },
    #[error("Surface has already been destroyed")]
    SurfaceDestroyed,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
