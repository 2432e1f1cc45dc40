//! Default values for configuration fields.

pub fn cell_width_px() -> i32 {
    8 // Typical monospace cell at 13px
}

pub fn font_size_px() -> f32 {
    13.0
}

pub fn language() -> String {
    "en".to_string()
}

pub fn shape_cache_capacity() -> usize {
    1024
}

pub fn width_cache_capacity() -> usize {
    1024
}

pub fn bool_true() -> bool {
    true
}
