use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::collections::HashMap;
use ttf_parser::Face;

/// Font-backed text measurement. Owned by one layout run; system fonts are
/// loaded lazily on the first measurement and dropped with the measurer.
pub struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    pub fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        if text.is_empty() || font_size <= 0.0 {
            return Some(0.0);
        }
        let family_key = normalize_family_key(font_family);
        if !self.faces.contains_key(&family_key) {
            let face = self.load_face(font_family);
            self.faces.insert(family_key.clone(), face);
        }
        let face = self.faces.get_mut(&family_key)?.as_mut()?;
        let normalized = text.replace('\t', "    ");
        face.measure_width(&normalized, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(fontdb::Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => {
                    order.push(FamilyToken::Generic(Family::Monospace))
                }
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let families: Vec<Family<'_>> = order
            .iter()
            .map(|token| match *token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            loaded = FontFace::new(data.to_vec(), index);
        });
        if loaded.is_none() {
            tracing::debug!(font_family, "no usable font face, falling back to table metrics");
        }
        loaded
    }
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        let mut face: Option<Face<'_>> = None;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else if let Some(cached) = self.advance_cache.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Face::parse(&self.data, self.index).ok();
                }
                let value = face.as_ref().and_then(|parsed| {
                    parsed
                        .glyph_index(ch)
                        .and_then(|glyph| parsed.glyph_hor_advance(glyph))
                });
                self.advance_cache.insert(ch, value);
                value
            };
            match advance {
                Some(advance) => width += advance as f32 * scale,
                None => width += fallback,
            }
        }

        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
