use serde::{Deserialize, Serialize};

/// Lead quality bucket derived from the uncapped lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadGrade {
    A,
    B,
    C,
    D,
}

/// Lower bounds scanned from the highest band down; the first match wins.
const GRADE_BANDS: [(u8, LeadGrade); 4] = [
    (80, LeadGrade::A),
    (60, LeadGrade::B),
    (40, LeadGrade::C),
    (0, LeadGrade::D),
];

impl LeadGrade {
    pub const fn ordered() -> [Self; 4] {
        [Self::A, Self::B, Self::C, Self::D]
    }

    pub fn from_score(score: u8) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(lower_bound, _)| score >= *lower_bound)
            .map(|(_, grade)| *grade)
            .unwrap_or(Self::D)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A급",
            Self::B => "B급",
            Self::C => "C급",
            Self::D => "D급",
        }
    }
}
