// File: src/core/layout.rs
use crate::core::geometry::{Point, Rect};
use crate::core::types::Key;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const DEFAULT_KEY_UNIT: f64 = 60.0;
const DEFAULT_KEY_HEIGHT: f64 = 50.0;
const DEFAULT_KEY_SPACING: f64 = 6.0;
/// Letter keys closer than this many key units are neighbors.
const NEIGHBOR_RADIUS_UNITS: f64 = 1.5;

/// Layout description as stored on disk (JSON).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSpec {
    #[serde(default = "default_key_unit")]
    pub key_unit: f64,
    #[serde(default = "default_key_height")]
    pub key_height: f64,
    #[serde(default = "default_key_spacing")]
    pub key_spacing: f64,
    pub rows: Vec<RowSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowSpec {
    /// Row index; the pixel y is derived from it.
    pub y: u32,
    /// Horizontal shift of the whole row, in key units.
    #[serde(default)]
    pub offset: f64,
    pub keys: Vec<KeySpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeySpec {
    pub code: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Position within the row, in key units.
    #[serde(default)]
    pub x: f64,
    /// Width in key units.
    #[serde(default = "default_key_width")]
    pub w: f64,
    #[serde(default)]
    pub special: bool,
    #[serde(default)]
    pub action: bool,
}

fn default_key_unit() -> f64 {
    DEFAULT_KEY_UNIT
}
fn default_key_height() -> f64 {
    DEFAULT_KEY_HEIGHT
}
fn default_key_spacing() -> f64 {
    DEFAULT_KEY_SPACING
}
fn default_key_width() -> f64 {
    1.0
}

/// Keys in pixel space plus lookup tables. Read-only once built, so it can be
/// shared behind an `Arc` by any number of recognizers.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    keys: Vec<Key>,
    index: HashMap<String, usize>,
    /// letter -> adjacent letters, in layout order
    neighbors: HashMap<char, Vec<char>>,
    key_unit: f64,
}

impl KeyboardLayout {
    /// Parses a JSON layout description. Fails on malformed JSON or when no
    /// keys result.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let spec: LayoutSpec =
            serde_json::from_str(json).map_err(|e| crate::Error::Layout(e.to_string()))?;
        let layout = Self::from_spec(&spec);
        if layout.keys.is_empty() {
            return Err(crate::Error::Layout("layout defines no keys".to_string()));
        }
        Ok(layout)
    }

    pub fn from_file(path: &Path) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Converts key-unit geometry into pixel rectangles.
    pub fn from_spec(spec: &LayoutSpec) -> Self {
        let unit = if spec.key_unit > 0.0 { spec.key_unit } else { DEFAULT_KEY_UNIT };
        let height = if spec.key_height > 0.0 { spec.key_height } else { DEFAULT_KEY_HEIGHT };
        let spacing = if spec.key_spacing >= 0.0 { spec.key_spacing } else { DEFAULT_KEY_SPACING };

        let mut keys = Vec::new();
        for row in &spec.rows {
            let y = row.y as f64 * (height + spacing);
            for k in &row.keys {
                let kx = k.x + row.offset;
                let kw = if k.w > 0.0 { k.w } else { 1.0 };

                // Each whole unit crossed adds one inter-key gap.
                let x = kx * unit + if kx > 0.0 { kx.floor() * spacing } else { 0.0 };
                let w = kw * unit + if kw > 1.0 { (kw - 1.0) * spacing } else { 0.0 };

                let label = k.label.clone().unwrap_or_else(|| k.code.clone());
                keys.push(Key::new(
                    k.code.clone(),
                    label,
                    Rect::new(x, y, w, height),
                    k.special || k.action,
                ));
            }
        }

        Self::from_keys(keys, unit)
    }

    /// Builds lookup tables around an explicit key list.
    pub fn from_keys(keys: Vec<Key>, key_unit: f64) -> Self {
        let mut index = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            index.insert(key.id.clone(), i);
        }

        let radius = key_unit * NEIGHBOR_RADIUS_UNITS;
        let mut neighbors: HashMap<char, Vec<char>> = HashMap::new();
        for key in &keys {
            let Some(c) = key.letter() else { continue };
            let adjacent = keys
                .iter()
                .filter(|other| other.id != key.id)
                .filter_map(|other| other.letter().map(|oc| (oc, other)))
                .filter(|(_, other)| key.center.distance_to(&other.center) < radius)
                .map(|(oc, _)| oc)
                .collect();
            neighbors.insert(c, adjacent);
        }

        debug!("Built layout with {} keys", keys.len());
        Self { keys, index, neighbors, key_unit }
    }

    /// Standard QWERTY letters with backspace, enter and space.
    pub fn qwerty() -> Self {
        fn row(y: u32, offset: f64, letters: &str, extra: Option<KeySpec>) -> RowSpec {
            let mut keys: Vec<KeySpec> = letters
                .chars()
                .enumerate()
                .map(|(i, c)| KeySpec {
                    code: c.to_string(),
                    label: None,
                    x: i as f64,
                    w: 1.0,
                    special: false,
                    action: false,
                })
                .collect();
            keys.extend(extra);
            RowSpec { y, offset, keys }
        }
        fn action(code: &str, x: f64, w: f64) -> KeySpec {
            KeySpec { code: code.to_string(), label: None, x, w, special: false, action: true }
        }

        let spec = LayoutSpec {
            key_unit: DEFAULT_KEY_UNIT,
            key_height: DEFAULT_KEY_HEIGHT,
            key_spacing: DEFAULT_KEY_SPACING,
            rows: vec![
                row(0, 0.0, "qwertyuiop", Some(action("backspace", 10.0, 1.5))),
                row(1, 0.5, "asdfghjkl", Some(action("enter", 9.0, 1.5))),
                row(2, 1.5, "zxcvbnm", None),
                row(3, 2.5, "", Some(action("space", 0.0, 5.0))),
            ],
        };
        Self::from_spec(&spec)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn key_unit(&self) -> f64 {
        self.key_unit
    }

    pub fn key_by_id(&self, id: &str) -> Option<&Key> {
        self.index.get(id).map(|&i| &self.keys[i])
    }

    /// Center of the key typing `c` (case-insensitive).
    pub fn letter_center(&self, c: char) -> Option<Point> {
        let mut buf = [0u8; 4];
        let id = c.to_ascii_lowercase().encode_utf8(&mut buf);
        self.key_by_id(id).map(|k| k.center)
    }

    /// Letters adjacent to `c` on this layout.
    pub fn neighbors(&self, c: char) -> &[char] {
        self.neighbors
            .get(&c.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Key under `p`, or else the key with the nearest center.
    /// Only `None` when the layout has no keys.
    pub fn nearest_key(&self, p: &Point) -> Option<(usize, f64)> {
        self.nearest_key_within(p, f64::INFINITY)
    }

    /// Like [`Self::nearest_key`] but rejects points whose nearest center is
    /// farther than `max_distance`. A containing rectangle always wins.
    pub fn nearest_key_within(&self, p: &Point, max_distance: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, key) in self.keys.iter().enumerate() {
            if key.bounds.contains(p) {
                return Some((i, key.center.distance_to(p)));
            }
            let d2 = key.center.distance_squared_to(p);
            if best.map_or(true, |(_, b)| d2 < b) {
                best = Some((i, d2));
            }
        }
        best.map(|(i, d2)| (i, d2.sqrt()))
            .filter(|&(_, d)| d <= max_distance)
    }
}
