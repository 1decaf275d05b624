use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stroke / fill color of the turtle. Displays as a CSS color string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Color {
    Rgb { r: u8, g: u8, b: u8 },
    /// Hue in degrees; saturation and lightness in percent.
    Hsl { h: f64, s: f64, l: f64 },
    Invisible,
}

impl Default for Color {
    fn default() -> Self { Color::WHITE }
}

const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("black",   (0, 0, 0)),
    ("white",   (255, 255, 255)),
    ("red",     (255, 0, 0)),
    ("green",   (0, 128, 0)),
    ("lime",    (0, 255, 0)),
    ("blue",    (0, 0, 255)),
    ("yellow",  (255, 255, 0)),
    ("cyan",    (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("orange",  (255, 165, 0)),
    ("purple",  (128, 0, 128)),
    ("pink",    (255, 192, 203)),
    ("brown",   (165, 42, 42)),
    ("gray",    (128, 128, 128)),
    ("grey",    (128, 128, 128)),
    ("silver",  (192, 192, 192)),
    ("gold",    (255, 215, 0)),
    ("navy",    (0, 0, 128)),
    ("teal",    (0, 128, 128)),
    ("olive",   (128, 128, 0)),
    ("maroon",  (128, 0, 0)),
    ("violet",  (238, 130, 238)),
];

impl Color {
    pub const WHITE: Color = Color::Rgb { r: 255, g: 255, b: 255 };

    /// Maps a hue fraction onto a fully saturated HSL color; the integer part
    /// is discarded so `1.25` and `0.25` give the same hue.
    pub fn from_hue(fraction: f64) -> Color {
        let h = fraction.rem_euclid(1.0) * 360.0;
        Color::Hsl { h, s: 100.0, l: 50.0 }
    }

    pub fn random(rng: &mut impl Rng) -> Color {
        Color::from_hue(rng.gen_range(0.0..1.0))
    }

    /// Parses a color word: a CSS name, `invisible`, or a 3/6 digit hex
    /// string with an optional leading `#`. `random` is handled by the caller.
    pub fn parse(text: &str) -> Option<Color> {
        let t = text.trim().to_ascii_lowercase();
        if t == "invisible" {
            return Some(Color::Invisible);
        }
        if let Some((_, (r, g, b))) = NAMED.iter().find(|(n, _)| *n == t) {
            return Some(Color::Rgb { r: *r, g: *g, b: *b });
        }
        parse_hex(t.strip_prefix('#').unwrap_or(&t))
    }

    /// True for words `Color::parse` accepts plus `random`.
    pub fn is_color_word(text: &str) -> bool {
        text.eq_ignore_ascii_case("random") || Color::parse(text).is_some()
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Color::Invisible)
    }

    /// sRGB components; `None` for the invisible color.
    pub fn to_rgb(&self) -> Option<(u8, u8, u8)> {
        match *self {
            Color::Rgb { r, g, b } => Some((r, g, b)),
            Color::Hsl { h, s, l } => Some(hsl_to_rgb(h, s / 100.0, l / 100.0)),
            Color::Invisible => None,
        }
    }
}

fn parse_hex(digits: &str) -> Option<Color> {
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let d: Vec<String> = digits.chars().map(|c| format!("{c}{c}")).collect();
            Some(Color::Rgb { r: channel(&d[0])?, g: channel(&d[1])?, b: channel(&d[2])? })
        }
        6 => Some(Color::Rgb {
            r: channel(&digits[0..2])?,
            g: channel(&digits[2..4])?,
            b: channel(&digits[4..6])?,
        }),
        _ => None,
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to8(r1), to8(g1), to8(b1))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Color::Hsl { h, s, l } => write!(f, "hsl({}, {}%, {}%)", h.round(), s.round(), l.round()),
            Color::Invisible => f.write_str("invisible"),
        }
    }
}
