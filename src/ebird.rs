//! eBird breeding codes and their BirdTrack equivalents.

use std::str::FromStr;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// An eBird breeding and behaviour code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter)]
#[allow(missing_docs)]
pub enum EbirdBreedingCode {
    NY,
    NE,
    FS,
    FY,
    CF,
    FL,
    ON,
    UN,
    DD,
    NB,
    CN,
    PE,
    B,
    A,
    N,
    C,
    T,
    P,
    M,
    S7,
    S,
    H,
    F,
}

impl EbirdBreedingCode {
    /// The BirdTrack breeding code with the same meaning.
    pub fn birdtrack_code(self) -> u8 {
        use EbirdBreedingCode::*;

        match self {
            NY => 16,
            NE => 15,
            FS | FY | CF => 14,
            ON => 13,
            FL => 12,
            UN => 11,
            DD | NB | CN | B => 9,
            PE => 8,
            A => 7,
            N => 6,
            C => 5,
            T => 4,
            P | H => 3,
            M | S7 | S => 2,
            F => 0,
        }
    }

    /// Get a static string representation.
    pub fn as_static_str(self) -> &'static str {
        self.into()
    }
}

/// Translate an eBird breeding code cell to BirdTrack's two digit form. Anything that is not an
/// eBird code becomes an empty cell.
pub fn translate_breeding_code(cell: &str) -> String {
    EbirdBreedingCode::from_str(cell.trim())
        .map(|code| format!("{:02}", code.birdtrack_code()))
        .unwrap_or_default()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use crate::observation::BreedingEvidence;
    use strum::IntoEnumIterator;

    #[test]
    fn test_translate_breeding_code() {
        assert_eq!(translate_breeding_code("NY"), "16");
        assert_eq!(translate_breeding_code(" B "), "09");
        assert_eq!(translate_breeding_code("S7"), "02");
        assert_eq!(translate_breeding_code("F"), "00");
        assert_eq!(translate_breeding_code("X"), "");
        assert_eq!(translate_breeding_code("ny"), "");
        assert_eq!(translate_breeding_code(""), "");
    }

    #[test]
    fn test_every_code_decodes_to_a_tier() {
        for code in EbirdBreedingCode::iter() {
            let translated = translate_breeding_code(code.as_static_str());
            let evidence = BreedingEvidence::from_code_str(&translated);
            assert!(
                evidence != BreedingEvidence::Invalid && evidence != BreedingEvidence::Unknown,
                "{} decoded to {}",
                code.as_static_str(),
                evidence
            );
        }

        assert_eq!(
            BreedingEvidence::decode(Some(i64::from(EbirdBreedingCode::FL.birdtrack_code()))),
            BreedingEvidence::ConfirmedBreeding
        );
    }
}
