use ratatui::style::Color;

pub const ACCENT: Color = Color::Rgb(171, 139, 255);
pub const STATUS_BG: Color = Color::Rgb(3, 0, 20);
pub const SELECTED_BG: Color = Color::Rgb(40, 30, 70);

pub fn rating_color(vote_average: Option<f64>) -> Color {
    match vote_average {
        Some(v) if v >= 7.5 => Color::Green,
        Some(v) if v >= 6.0 => Color::Yellow,
        Some(v) if v > 0.0 => Color::LightRed,
        _ => Color::DarkGray,
    }
}

pub fn language_color(lang: &str) -> Color {
    match lang {
        "EN" => Color::Gray,
        "JA" | "KO" | "ZH" | "CN" => Color::LightMagenta,
        "FR" | "ES" | "IT" | "DE" | "PT" => Color::LightCyan,
        "HI" | "TA" | "TE" => Color::LightYellow,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands() {
        assert_eq!(rating_color(Some(8.1)), Color::Green);
        assert_eq!(rating_color(Some(6.0)), Color::Yellow);
        assert_eq!(rating_color(Some(3.2)), Color::LightRed);
        assert_eq!(rating_color(Some(0.0)), Color::DarkGray);
        assert_eq!(rating_color(None), Color::DarkGray);
    }
}
