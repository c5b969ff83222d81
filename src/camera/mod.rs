//! Camera page rendering.
//!
//! A camera page is a self-contained HTML document that shows one GIF
//! full-bleed. The meeting bot loads it as its outgoing video.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Renders the camera page for the given GIF bytes.
pub fn render_page(gif: &[u8]) -> String {
    let encoded = STANDARD.encode(gif);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Bot Camera</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        html, body {{
            width: 100%;
            height: 100%;
            overflow: hidden;
            background: #000;
        }}
        img {{
            width: 100%;
            height: 100%;
            object-fit: cover;
            display: block;
        }}
    </style>
</head>
<body>
    <img src="data:image/gif;base64,{encoded}" alt="Bot Animation">
</body>
</html>"#
    )
}
