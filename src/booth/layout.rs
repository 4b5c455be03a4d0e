//! Layout templates.
//!
//! The set of layouts is fixed at compile time. Each template decides how many
//! shots a session takes and how the frames are arranged on the exported strip.

use serde::Serialize;

use crate::error::{BoothError, Result};

/// A named, immutable photo-layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutTemplate {
    pub id: &'static str,
    pub label: &'static str,
    /// Shots required to complete a session (always >= 1)
    pub photo_count: usize,
    /// 1 or 2
    pub columns: u32,
    /// Nominal render width in design units
    pub display_width: u32,
    /// Nominal render height in design units
    pub display_height: u32,
}

pub const STRIP_2X6_3: LayoutTemplate = LayoutTemplate {
    id: "STRIP_2x6_3",
    label: "2x6 Strip (3 Photos)",
    photo_count: 3,
    columns: 1,
    display_width: 220,
    display_height: 660,
};

pub const STRIP_2X6_4: LayoutTemplate = LayoutTemplate {
    id: "STRIP_2x6_4",
    label: "2x6 Strip (4 Photos)",
    photo_count: 4,
    columns: 1,
    display_width: 220,
    display_height: 850,
};

pub const GRID_4X6_6: LayoutTemplate = LayoutTemplate {
    id: "GRID_4x6_6",
    label: "4x6 Grid (6 Photos)",
    photo_count: 6,
    columns: 2,
    display_width: 400,
    display_height: 600,
};

pub const POSTCARD_4X6: LayoutTemplate = LayoutTemplate {
    id: "POSTCARD_4x6",
    label: "4x6 Postcard",
    photo_count: 2,
    columns: 2,
    display_width: 400,
    display_height: 400,
};

/// All layouts, in menu order.
pub static LAYOUTS: [LayoutTemplate; 4] = [STRIP_2X6_3, STRIP_2X6_4, GRID_4X6_6, POSTCARD_4X6];

pub const DEFAULT_LAYOUT_ID: &str = "GRID_4x6_6";

impl LayoutTemplate {
    /// Look up a template by its exact id.
    pub fn find(id: &str) -> Option<&'static LayoutTemplate> {
        LAYOUTS.iter().find(|layout| layout.id == id)
    }

    /// Like [`LayoutTemplate::find`], but an unknown id is a validation error.
    pub fn resolve(id: &str) -> Result<&'static LayoutTemplate> {
        Self::find(id).ok_or_else(|| {
            BoothError::Validation(format!(
                "unknown layout '{}' (expected one of: {})",
                id,
                LAYOUTS.iter().map(|l| l.id).collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Number of grid rows the frames occupy.
    pub fn rows(&self) -> u32 {
        (self.photo_count as u32).div_ceil(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_invariants_hold() {
        for layout in LAYOUTS.iter() {
            assert!(layout.photo_count >= 1, "{} has no shots", layout.id);
            assert!(
                layout.columns == 1 || layout.columns == 2,
                "{} has {} columns",
                layout.id,
                layout.columns
            );
        }
    }

    #[test]
    fn test_layout_ids_unique() {
        let mut ids: Vec<_> = LAYOUTS.iter().map(|l| l.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), LAYOUTS.len());
    }

    #[test]
    fn test_find_is_exact() {
        assert_eq!(LayoutTemplate::find("GRID_4x6_6"), Some(&GRID_4X6_6));
        assert!(LayoutTemplate::find("grid_4x6_6").is_none());
        assert!(LayoutTemplate::find("").is_none());
    }

    #[test]
    fn test_resolve_unknown_is_validation_error() {
        let err = LayoutTemplate::resolve("POLAROID").unwrap_err();
        assert!(matches!(err, BoothError::Validation(_)));
        assert!(err.to_string().contains("STRIP_2x6_3"));
    }

    #[test]
    fn test_default_layout_exists() {
        assert!(LayoutTemplate::find(DEFAULT_LAYOUT_ID).is_some());
    }

    #[test]
    fn test_rows() {
        assert_eq!(STRIP_2X6_3.rows(), 3);
        assert_eq!(STRIP_2X6_4.rows(), 4);
        assert_eq!(GRID_4X6_6.rows(), 3);
        assert_eq!(POSTCARD_4X6.rows(), 1);
    }
}
