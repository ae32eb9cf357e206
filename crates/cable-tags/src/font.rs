//! Font resolution and metrics
//!
//! Tags are set in a bold serif face. A TrueType file is looked up from the
//! options, then from well-known system locations. Failing both, the bundled
//! DejaVu Sans Condensed Bold keeps Cyrillic text intact. The PDF built-in
//! Times-Bold with approximate metrics is only used if that face cannot load.

use crate::options::FontOptions;
use crate::text::{TextMeasure, approx_char_width_pt};
use crate::types::{Result, TagError};
use printpdf::ParsedFont;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Name of the face the layout is tuned for
pub const LOGICAL_FONT_NAME: &str = "Times New Roman Bold";

const BUNDLED_FONT: &[u8] = include_bytes!("../fonts/DejaVuSansCondensed-Bold.ttf");
const BUNDLED_FONT_NAME: &str = "bundled DejaVu Sans Condensed Bold";

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "timesbd.ttf",
    "TIMESBD.TTF",
    "/usr/share/fonts/truetype/msttcorefonts/Times_New_Roman_Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/liberation-serif/LiberationSerif-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif-Bold.ttf",
    "/Library/Fonts/Times New Roman Bold.ttf",
    "C:/Windows/Fonts/timesbd.ttf",
];

enum FontSource {
    Embedded {
        path: PathBuf,
        parsed: Box<ParsedFont>,
    },
    Builtin,
}

/// The font every tag is drawn and measured with
pub struct ResolvedFont {
    source: FontSource,
    missing_glyphs: Mutex<BTreeSet<char>>,
}

impl ResolvedFont {
    /// PDF built-in Times-Bold with approximate metrics
    pub fn builtin() -> Self {
        Self {
            source: FontSource::Builtin,
            missing_glyphs: Mutex::new(BTreeSet::new()),
        }
    }

    /// Load a TrueType file for both embedding and measurement
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, path)
    }

    pub fn from_bytes(bytes: &[u8], path: impl Into<PathBuf>) -> Result<Self> {
        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings)
            .ok_or_else(|| TagError::Font("Failed to parse font".to_string()))?;
        if parsed.lookup_glyph_index('A' as u32).is_none() {
            return Err(TagError::Font(
                "Font has no usable Unicode character map".to_string(),
            ));
        }

        Ok(Self {
            source: FontSource::Embedded {
                path: path.into(),
                parsed: Box::new(parsed),
            },
            missing_glyphs: Mutex::new(BTreeSet::new()),
        })
    }

    /// DejaVu Sans Condensed Bold compiled into the library
    pub fn bundled() -> Result<Self> {
        Self::from_bytes(BUNDLED_FONT, BUNDLED_FONT_NAME)
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.source, FontSource::Builtin)
    }

    /// Font to embed, if any
    pub fn parsed_font(&self) -> Option<&ParsedFont> {
        match &self.source {
            FontSource::Embedded { parsed, .. } => Some(parsed.as_ref()),
            FontSource::Builtin => None,
        }
    }

    pub fn description(&self) -> String {
        match &self.source {
            FontSource::Embedded { path, .. } => path.display().to_string(),
            FontSource::Builtin => "built-in Times-Bold".to_string(),
        }
    }

    fn note_missing_glyph(&self, ch: char) {
        if let Ok(mut missing) = self.missing_glyphs.lock() {
            if missing.insert(ch) {
                log::warn!(
                    "No metrics for {:?} in {}, using approximate width",
                    ch,
                    self.description()
                );
            }
        }
    }
}

impl TextMeasure for ResolvedFont {
    fn text_width_pt(&self, text: &str, font_size_pt: f32) -> f32 {
        match &self.source {
            FontSource::Embedded { parsed, .. } => {
                let units_per_em = parsed.font_metrics.units_per_em as f32;
                text.chars()
                    .map(|ch| {
                        let advance = parsed
                            .lookup_glyph_index(ch as u32)
                            .map(|glyph| parsed.get_horizontal_advance(glyph))
                            .filter(|&advance| advance > 0);
                        match advance {
                            Some(advance) => advance as f32 / units_per_em * font_size_pt,
                            None => {
                                self.note_missing_glyph(ch);
                                approx_char_width_pt(ch, font_size_pt)
                            }
                        }
                    })
                    .sum()
            }
            FontSource::Builtin => text
                .chars()
                .map(|ch| approx_char_width_pt(ch, font_size_pt))
                .sum(),
        }
    }
}

/// Resolve the tag face; never fails, the built-in font is the last resort
pub fn resolve_font(options: &FontOptions) -> ResolvedFont {
    if let Some(path) = &options.font_path {
        match ResolvedFont::from_file(path) {
            Ok(font) => {
                log::info!("Using font {}", path.display());
                return font;
            }
            Err(e) => log::warn!("Cannot use font {}: {}", path.display(), e),
        }
    }

    if options.use_system_fonts {
        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.is_file() {
                continue;
            }
            match ResolvedFont::from_file(path) {
                Ok(font) => {
                    log::info!("Using font {} for {}", path.display(), LOGICAL_FONT_NAME);
                    return font;
                }
                Err(e) => log::warn!("Skipping font {}: {}", path.display(), e),
            }
        }
    }

    match ResolvedFont::bundled() {
        Ok(font) => {
            log::info!("{} not found, using {}", LOGICAL_FONT_NAME, BUNDLED_FONT_NAME);
            font
        }
        Err(e) => {
            log::warn!(
                "Cannot load {}: {}; falling back to built-in Times-Bold, non-Latin text may not render",
                BUNDLED_FONT_NAME,
                e
            );
            ResolvedFont::builtin()
        }
    }
}
