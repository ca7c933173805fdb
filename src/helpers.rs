use macroquad::prelude::*;

pub fn asset_path(name: &str) -> String {
    format!("assets/{name}")
}

pub async fn load_filtered_texture(name: &str) -> Result<Texture2D, macroquad::Error> {
    let texture = load_texture(&asset_path(name)).await?;
    texture.set_filter(FilterMode::Nearest);
    Ok(texture)
}

pub fn expand_rect(rect: Rect, pad: f32) -> Rect {
    Rect::new(
        rect.x - pad,
        rect.y - pad,
        rect.w + pad * 2.0,
        rect.h + pad * 2.0,
    )
}

/// Clamps a box origin so the whole box stays inside `bounds`.
pub fn clamp_rect_to_bounds(pos: Vec2, size: Vec2, bounds: Rect) -> Vec2 {
    let max_x = (bounds.x + bounds.w - size.x).max(bounds.x);
    let max_y = (bounds.y + bounds.h - size.y).max(bounds.y);
    vec2(pos.x.clamp(bounds.x, max_x), pos.y.clamp(bounds.y, max_y))
}
