use crate::{DecodedImage, FailureKind, FetchError};

/// Decode an encoded tree visualization (PNG) into RGBA8 pixels.
pub fn decode_tree_image(bytes: &[u8]) -> Result<DecodedImage, FetchError> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}
