//! Plot adapters for the display view.
//!
//! Both adapters share one styling contract: every provenance tag maps to a
//! `SeriesStyle`, so history and forecast look the same in the terminal plot
//! and the TUI chart.

pub mod ascii;

pub use ascii::*;

use crate::domain::Provenance;

/// How one provenance segment is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    /// Marker for observations in the ASCII plot.
    pub marker: char,
    /// Line character in the ASCII plot.
    pub line: char,
    /// RGB colour for graphical backends.
    pub rgb: (u8, u8, u8),
}

/// Two-colour styling: history in cyan, forecast in orange.
pub fn style_for(tag: Provenance) -> SeriesStyle {
    match tag {
        Provenance::Source => SeriesStyle {
            marker: 'o',
            line: '-',
            rgb: (0, 255, 255),
        },
        Provenance::Forecast => SeriesStyle {
            marker: '*',
            line: '.',
            rgb: (255, 165, 0),
        },
    }
}

/// RGB colour for a provenance tag.
pub fn color_for(tag: Provenance) -> (u8, u8, u8) {
    style_for(tag).rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_get_distinct_styles() {
        let source = style_for(Provenance::Source);
        let forecast = style_for(Provenance::Forecast);
        assert_ne!(source.marker, forecast.marker);
        assert_ne!(source.line, forecast.line);
        assert_ne!(color_for(Provenance::Source), color_for(Provenance::Forecast));
        assert_eq!(color_for(Provenance::Forecast), forecast.rgb);
    }
}
