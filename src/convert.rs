use crate::error::SynthResult;
use std::path::Path;

/// Re-encodes a binary (P5) PGM as PNG.
#[cfg(feature = "convert")]
pub fn pgm_to_png(input: &Path, output: &Path) -> SynthResult<()> {
    use image::{ImageFormat, ImageReader};

    let img = ImageReader::open(input)?
        .with_guessed_format()?
        .decode()?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut png = std::io::Cursor::new(Vec::new());
    img.into_luma8().write_to(&mut png, ImageFormat::Png)?;
    crate::artifacts::write_atomic(output, png.get_ref())?;
    tracing::info!(input = %input.display(), output = %output.display(), "converted pgm");
    Ok(())
}

#[cfg(not(feature = "convert"))]
pub fn pgm_to_png(_input: &Path, _output: &Path) -> SynthResult<()> {
    Err(crate::error::SynthError::MissingDependency {
        component: "PGM conversion",
        hint: "rebuild with `--features convert` to enable the image backend",
    })
}

/// Returns whether [`pgm_to_png`] is compiled in.
pub fn conversion_available() -> bool {
    cfg!(feature = "convert")
}
