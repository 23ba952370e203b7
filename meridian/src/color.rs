use serde::{Deserialize, Deserializer, Serialize};

/// Color representation.
///
/// Serialized as a hex string: `#RRGGBB` for opaque colors, `#RRGGBBAA` otherwise.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value).ok_or_else(|| format!("invalid color '{value}'"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_css_hex()
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// Default layer color: `#2563EB`
    pub const BLUE: Color = Color::from_hex("#2563eb");
    /// Default color of imported shapefiles: `#16A34A`
    pub const GREEN: Color = Color::from_hex("#16a34a");

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Converts the color into a CSS hex string: lowercase `#rrggbb` for opaque colors and `#rrggbbaa` for the
    /// rest.
    pub fn to_css_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }

    /// Parses a color from the hex string. Hex string can be HEX6 (`#RRGGBB`), HEX8 (`#RRGGBBAA`) or the short
    /// CSS forms `#RGB` and `#RGBA`.
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        if !hex_string.is_ascii() {
            return None;
        }
        let digits = hex_string.strip_prefix('#')?;

        match digits.len() {
            3 | 4 => {
                let mut channels = digits
                    .chars()
                    .map(|c| c.to_digit(16).map(|v| v as u8 * 17));
                let r = channels.next()??;
                let g = channels.next()??;
                let b = channels.next()??;
                let a = channels.next().unwrap_or(Some(255))?;
                Some(Self { r, g, b, a })
            }
            6 | 8 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                let a = if digits.len() == 8 {
                    u8::from_str_radix(&digits[6..8], 16).ok()?
                } else {
                    255
                };
                Some(Self { r, g, b, a })
            }
            _ => None,
        }
    }

    /// Parses a color from the hex string. Hex string can be either HEX6 (`#RRGGBB`) or HEX8 (`#RRGGBBAA`).
    ///
    /// # Panics
    ///
    /// Panics if the parsing fails.
    pub const fn from_hex(hex_string: &'static str) -> Self {
        let bytes = hex_string.as_bytes();
        if bytes.len() != 7 && bytes.len() != 9 || bytes[0] != b'#' {
            panic!("Invalid color hex string");
        }

        let r = decode_byte(&[bytes[1], bytes[2]]);
        let g = decode_byte(&[bytes[3], bytes[4]]);
        let b = decode_byte(&[bytes[5], bytes[6]]);
        let a = if hex_string.len() == 9 {
            decode_byte(&[bytes[7], bytes[8]])
        } else {
            255
        };

        Self { r, g, b, a }
    }

    /// Returns true if the color is fully transparent (`a == 0`).
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Opacity component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }
}

/// Deserializes an optional color, treating values that are not valid colors as absent so that the default color
/// is used instead.
pub(crate) fn lenient_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let color = value
            .as_str()
            .and_then(|hex| Color::try_from_hex(hex.trim()));
        if color.is_none() {
            log::warn!("Invalid color {value}, using the default one");
        }
        color
    }))
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css_hex())
    }
}

const fn decode_byte(chars: &[u8]) -> u8 {
    debug_assert!(chars.len() == 2);
    let first = decode_char(chars[0]);
    let second = decode_char(chars[1]);

    first * 16 + second
}

const fn decode_char(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => panic!("Invalid hex character"),
    }
}
