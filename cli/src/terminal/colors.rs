use colored::Color;

pub const PRIMARY: Color = Color::Yellow;
pub const ACCENT: Color = Color::BrightGreen;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor {
    r: 192,
    g: 192,
    b: 192,
};
pub const IPV4_ADDR: Color = Color::Cyan;
pub const PORTS: Color = Color::Magenta;
pub const EMPTY: Color = Color::BrightBlack;
