/// Exclusive upper bound of the 8-bit hue channel (degrees halved).
pub const HUE_RANGE: usize = 180;
/// Exclusive upper bound of the saturation and value channels.
pub const SV_RANGE: usize = 256;

/// Converts one 8-bit RGB pixel to 8-bit HSV.
///
/// Encoding:
/// - `V = max(R, G, B)`
/// - `S = round(255 · (V − min) / V)`, 0 for black
/// - `H = round(hue° / 2)` in `0..180`, 0 for greys
///
/// Rounding is half-up, so results are reproducible across platforms.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = [rgb[0] as i32, rgb[1] as i32, rgb[2] as i32];
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        round_half_up(255.0 * diff as f64 / v as f64)
    };

    let h = if diff == 0 {
        0
    } else {
        // Position within the hue circle in units of `diff`, one sector per
        // dominant channel: red [-1, 1], green [1, 3], blue [3, 5].
        let sector = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let h = round_half_up(sector as f64 * 30.0 / diff as f64);
        if h < 0 { h + HUE_RANGE as i32 } else { h }
    };

    [h as u8, s as u8, v as u8]
}

fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}
