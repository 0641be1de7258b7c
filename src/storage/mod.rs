pub mod images;

pub use images::{ImageFolder, ImageStore};
