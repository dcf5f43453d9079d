pub mod confirmation;
pub mod constants;
pub mod editor;
pub mod texture;
