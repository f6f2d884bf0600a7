use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, Luma};
use qrcode::QrCode;
use std::io::Cursor;

/// Render a PIX copy-and-paste payload as a base64-encoded PNG QR code.
pub fn render_qr_base64(payload: &str) -> Result<String> {
    let code = QrCode::new(payload.as_bytes())?;
    let image = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

    let dynamic_image = DynamicImage::ImageLuma8(image);
    let mut buffer = Cursor::new(Vec::new());
    dynamic_image.write_to(&mut buffer, image::ImageOutputFormat::Png)?;

    Ok(general_purpose::STANDARD.encode(buffer.get_ref()))
}
