pub mod align;
pub mod document;
pub mod planning;
pub mod scene;
pub mod segment;
pub mod transcript;
