//! Static assets embedded into the binary

use rust_embed::RustEmbed;
use std::borrow::Cow;

/// Files from the assets directory
#[derive(RustEmbed)]
#[folder = "assets"]
struct Assets;

/// The search page served at `/`
pub fn index_html() -> Option<Cow<'static, [u8]>> {
    Assets::get("index.html").map(|file| file.data)
}
