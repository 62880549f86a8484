use std::fmt;

use serde::{Deserialize, Serialize};

/// Classe d'intrusion produite par une sous-fenêtre ou par le vote d'une époque.
///
/// L'ordre de déclaration n'a aucune signification : la priorité de
/// départage est une politique de [`ClassLabel::TIE_BREAK_PRIORITY`].
///
/// # Example
/// ```
/// use gw_core::label::ClassLabel;
/// assert_eq!(ClassLabel::default(), ClassLabel::NoActivity);
/// assert_eq!(ClassLabel::GlassBreak.to_string(), "glass break");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ClassLabel {
    /// Silence, background noise, or sub-audible content.
    #[default]
    NoActivity,
    /// Glass break.
    GlassBreak,
    /// Foot steps.
    Footsteps,
    /// Voices.
    Voices,
    /// Narrow high sub-band ("mosquito").
    Other,
}

impl ClassLabel {
    /// Number of labels.
    pub const COUNT: usize = 5;

    /// Every label, in tally-slot order.
    pub const ALL: [ClassLabel; Self::COUNT] = [
        ClassLabel::NoActivity,
        ClassLabel::GlassBreak,
        ClassLabel::Footsteps,
        ClassLabel::Voices,
        ClassLabel::Other,
    ];

    /// Départage des égalités : le premier label dont le compteur est >= à
    /// tous ceux qui le suivent gagne.
    pub const TIE_BREAK_PRIORITY: [ClassLabel; Self::COUNT] = [
        ClassLabel::GlassBreak,
        ClassLabel::Footsteps,
        ClassLabel::Voices,
        ClassLabel::NoActivity,
        ClassLabel::Other,
    ];

    /// Tally slot of this label.
    #[inline(always)]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ClassLabel::NoActivity => 0,
            ClassLabel::GlassBreak => 1,
            ClassLabel::Footsteps => 2,
            ClassLabel::Voices => 3,
            ClassLabel::Other => 4,
        }
    }

    /// `true` for every label except [`ClassLabel::NoActivity`].
    #[must_use]
    pub fn is_intrusion(self) -> bool {
        self != ClassLabel::NoActivity
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ClassLabel::NoActivity => "no intrusion",
            ClassLabel::GlassBreak => "glass break",
            ClassLabel::Footsteps => "foot steps",
            ClassLabel::Voices => "voices",
            ClassLabel::Other => "mosquito",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_all_order() {
        for (i, label) in ClassLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
        }
    }

    #[test]
    fn tie_break_priority_is_a_permutation() {
        let mut seen = [false; ClassLabel::COUNT];
        for label in ClassLabel::TIE_BREAK_PRIORITY {
            assert!(!seen[label.index()], "{label:?} listed twice");
            seen[label.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn labels_deserialize_by_variant_name() {
        #[derive(Deserialize)]
        struct Wrapper {
            label: ClassLabel,
        }
        let w: Wrapper = toml::from_str("label = \"GlassBreak\"").unwrap();
        assert_eq!(w.label, ClassLabel::GlassBreak);
    }
}
