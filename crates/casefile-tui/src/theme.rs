use crate::settings::ThemeName;
use crossterm::style::Color;

/// Colours for every screen
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Grid lines
    pub border: Color,
    /// Separators between attribute categories
    pub category_border: Color,
    /// Row and column labels
    pub label: Color,
    /// Cells marked true
    pub mark_true: Color,
    /// Cells marked false
    pub mark_false: Color,
    /// Unknown cells
    pub unknown: Color,
    /// Selected cell / menu entry background
    pub selected_bg: Color,
    /// Row and column of the cursor
    pub highlight_bg: Color,
    /// Errors and failed checks
    pub error: Color,
    /// Solved and confirmations
    pub success: Color,
    /// Timer/info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
    /// Premium cases that are still locked
    pub locked: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
            ThemeName::HighContrast => Self::high_contrast(),
        }
    }

    /// Default theme
    pub fn dark() -> Self {
        // Late-night office: ink blue with brass accents
        Self {
            bg: Color::Rgb { r: 16, g: 18, b: 24 },
            fg: Color::Rgb { r: 222, g: 218, b: 205 },
            border: Color::Rgb { r: 64, g: 70, b: 84 },
            category_border: Color::Rgb { r: 150, g: 128, b: 82 },
            label: Color::Rgb { r: 205, g: 178, b: 118 },
            mark_true: Color::Rgb { r: 108, g: 214, b: 140 },
            mark_false: Color::Rgb { r: 226, g: 104, b: 92 },
            unknown: Color::Rgb { r: 88, g: 94, b: 110 },
            selected_bg: Color::Rgb { r: 82, g: 66, b: 38 },
            highlight_bg: Color::Rgb { r: 30, g: 33, b: 44 },
            error: Color::Rgb { r: 240, g: 96, b: 84 },
            success: Color::Rgb { r: 124, g: 230, b: 150 },
            info: Color::Rgb { r: 150, g: 156, b: 172 },
            key: Color::Rgb { r: 236, g: 196, b: 104 },
            locked: Color::Rgb { r: 104, g: 104, b: 116 },
        }
    }

    /// Paper theme for light terminals
    pub fn light() -> Self {
        // Manila folder and typewriter ink
        Self {
            bg: Color::Rgb { r: 244, g: 236, b: 214 },
            fg: Color::Rgb { r: 40, g: 36, b: 32 },
            border: Color::Rgb { r: 176, g: 164, b: 138 },
            category_border: Color::Rgb { r: 96, g: 72, b: 40 },
            label: Color::Rgb { r: 110, g: 70, b: 26 },
            mark_true: Color::Rgb { r: 34, g: 120, b: 64 },
            mark_false: Color::Rgb { r: 176, g: 44, b: 36 },
            unknown: Color::Rgb { r: 150, g: 140, b: 120 },
            selected_bg: Color::Rgb { r: 226, g: 206, b: 150 },
            highlight_bg: Color::Rgb { r: 234, g: 224, b: 198 },
            error: Color::Rgb { r: 190, g: 40, b: 32 },
            success: Color::Rgb { r: 30, g: 130, b: 70 },
            info: Color::Rgb { r: 100, g: 92, b: 80 },
            key: Color::Rgb { r: 150, g: 90, b: 10 },
            locked: Color::Rgb { r: 168, g: 160, b: 148 },
        }
    }

    /// High contrast theme
    pub fn high_contrast() -> Self {
        Self {
            bg: Color::Black,
            fg: Color::White,
            border: Color::Grey,
            category_border: Color::White,
            label: Color::Yellow,
            mark_true: Color::Green,
            mark_false: Color::Red,
            unknown: Color::Grey,
            selected_bg: Color::Blue,
            highlight_bg: Color::DarkBlue,
            error: Color::Red,
            success: Color::Green,
            info: Color::Cyan,
            key: Color::Yellow,
            locked: Color::DarkGrey,
        }
    }
}
