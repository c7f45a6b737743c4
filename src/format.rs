use std::fmt;

/// Vertical resolutions offered in the quality selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    #[default]
    P720,
    P1080,
    P1440,
    P2160,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::P720, Quality::P1080, Quality::P1440, Quality::P2160];

    pub fn height(self) -> u32 {
        match self {
            Quality::P720 => 720,
            Quality::P1080 => 1080,
            Quality::P1440 => 1440,
            Quality::P2160 => 2160,
        }
    }

    pub fn format_expression(self) -> String {
        select_format(self.height())
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height())
    }
}

impl TryFrom<u32> for Quality {
    type Error = u32;

    fn try_from(height: u32) -> Result<Self, Self::Error> {
        Quality::ALL
            .into_iter()
            .find(|q| q.height() == height)
            .ok_or(height)
    }
}

/// Builds the yt-dlp format expression for a maximum height: the best video
/// at or below it merged with the best audio, falling back to the best single
/// stream at or below it.
pub fn select_format(height: u32) -> String {
    format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_format_1080() {
        assert_eq!(
            select_format(1080),
            "bestvideo[height<=1080]+bestaudio/best[height<=1080]"
        );
    }

    #[test]
    fn test_select_format_mentions_height_in_both_clauses() {
        for quality in Quality::ALL {
            let expr = quality.format_expression();
            let height = quality.height().to_string();
            assert_eq!(expr.matches(&height).count(), 2, "{expr}");
            assert_eq!(expr, quality.format_expression());
        }
    }

    #[test]
    fn test_quality_from_height() {
        assert_eq!(Quality::try_from(1440), Ok(Quality::P1440));
        assert_eq!(Quality::try_from(480), Err(480));
    }

    #[test]
    fn test_quality_display() {
        assert_eq!(Quality::P2160.to_string(), "2160p");
        assert_eq!(Quality::default(), Quality::P720);
    }
}
