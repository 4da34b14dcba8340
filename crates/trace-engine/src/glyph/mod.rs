pub mod outline_font;
pub mod rasterizer;
pub mod source;
pub mod stroke_font;
