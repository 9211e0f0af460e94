//! The free text categories of an RSPB export, and what they mean in BirdTrack terms.

/// How the primary count of a record was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountType {
    /// An exact number.
    Number,
    /// An estimate.
    Estimate,
    /// The largest count over a period.
    MaximumCount,
    /// A lower bound.
    MinimumCount,
    /// Present, the count is usually `Y`.
    Present,
    /// A label this crate does not know.
    Other(String),
}

impl From<&str> for CountType {
    fn from(label: &str) -> Self {
        match label.trim() {
            "Number" => CountType::Number,
            "Estimate" => CountType::Estimate,
            "Maximum count" => CountType::MaximumCount,
            "Minimum count" => CountType::MinimumCount,
            "Present" => CountType::Present,
            other => CountType::Other(other.to_owned()),
        }
    }
}

impl CountType {
    /// The count as BirdTrack expects it. A primary count of `Y` means one bird.
    ///
    /// Returns `None` for an unknown count type.
    pub fn birdtrack_count(&self, primary_count: &str) -> Option<String> {
        let primary = match primary_count.trim() {
            "Y" => "1",
            other => other,
        };

        match self {
            CountType::Number | CountType::Present => Some(primary.to_owned()),
            CountType::Estimate | CountType::MaximumCount => Some(format!("c{}", primary)),
            CountType::MinimumCount => Some(format!("{}+", primary)),
            CountType::Other(_) => None,
        }
    }
}

/// Behaviour noted with a record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Activity {
    Singing,
    CarryingFood,
    NestUnderConstruction,
    NestBuilding,
    VisitingNestSite,
    Mating,
    Displaying,
    FamilyParty,
    ApparentlyIncubating,
    IncubatingEggsOrChicks,
    FeedingDrinking,
    Hunting,
    InFlight,
    AtRoost,
    NotRecorded,
    /// A label this crate does not know.
    Other(String),
}

impl From<&str> for Activity {
    fn from(label: &str) -> Self {
        use Activity::*;

        match label.trim() {
            "Singing" => Singing,
            "Adults carrying faecal sac or food for young" => CarryingFood,
            "Nest under construction" => NestUnderConstruction,
            "Nest building or excavating" => NestBuilding,
            "Visiting nest site" => VisitingNestSite,
            "Mating" => Mating,
            "Displaying" => Displaying,
            "Family party" => FamilyParty,
            "Apparently incubating" => ApparentlyIncubating,
            "Adult observed incubating eggs/chicks" => IncubatingEggsOrChicks,
            "Feeding/Drinking" => FeedingDrinking,
            "Hunting" => Hunting,
            "In flight" => InFlight,
            "At roost" => AtRoost,
            "Not recorded" => NotRecorded,
            other => Other(other.to_owned()),
        }
    }
}

impl Activity {
    /// The BirdTrack breeding code this behaviour is evidence for.
    pub fn breeding_code(&self) -> Option<u8> {
        use Activity::*;

        match self {
            Singing => Some(2),
            Mating | Displaying => Some(5),
            VisitingNestSite => Some(6),
            NestUnderConstruction | NestBuilding => Some(9),
            FamilyParty => Some(12),
            CarryingFood => Some(14),
            ApparentlyIncubating => Some(15),
            IncubatingEggsOrChicks => Some(16),
            FeedingDrinking | Hunting | InFlight | AtRoost | NotRecorded | Other(_) => None,
        }
    }

    /// The BirdTrack activity code.
    pub fn activity_code(&self) -> Option<u8> {
        use Activity::*;

        match self {
            FeedingDrinking | Hunting => Some(1),
            InFlight => Some(2),
            AtRoost => Some(4),
            ApparentlyIncubating | IncubatingEggsOrChicks => Some(7),
            _ => None,
        }
    }
}

/// What the primary count of a record counts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CountUnit {
    SingingMale,
    Pair,
    RecentlyHatchedChick,
    AdultWithBrood,
    Chick,
    PartGrownChick,
    ApparentlyOccupiedTerritory,
    ApparentlyOccupiedBurrow,
    ApparentlyOccupiedNest,
    AdultMale,
    AdultFemale,
    /// A label this crate does not know, including plain individuals.
    Other(String),
}

impl From<&str> for CountUnit {
    fn from(label: &str) -> Self {
        use CountUnit::*;

        match label.trim() {
            "Singing/Displaying male" => SingingMale,
            "Pair" => Pair,
            "Recently hatched chick" => RecentlyHatchedChick,
            "Adult(s) with brood" => AdultWithBrood,
            "Chick" => Chick,
            "Part grown chick" => PartGrownChick,
            "Apparently occupied territory" => ApparentlyOccupiedTerritory,
            "Apparently occupied burrow" => ApparentlyOccupiedBurrow,
            "Apparently occupied nest" => ApparentlyOccupiedNest,
            "Adult Male" => AdultMale,
            "Adult Female" => AdultFemale,
            other => Other(other.to_owned()),
        }
    }
}

impl CountUnit {
    /// The BirdTrack breeding code implied by counting in this unit.
    pub fn breeding_code(&self) -> Option<u8> {
        use CountUnit::*;

        match self {
            SingingMale => Some(2),
            Pair => Some(3),
            ApparentlyOccupiedTerritory => Some(4),
            ApparentlyOccupiedBurrow | ApparentlyOccupiedNest => Some(13),
            RecentlyHatchedChick | AdultWithBrood | Chick | PartGrownChick => Some(16),
            AdultMale | AdultFemale | Other(_) => None,
        }
    }

    /// The sex of the birds counted, for units that count one sex.
    pub fn sex(&self) -> Option<char> {
        match self {
            CountUnit::AdultMale => Some('M'),
            CountUnit::AdultFemale => Some('F'),
            _ => None,
        }
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_count_type() {
        assert_eq!(CountType::from("Number").birdtrack_count("4"), Some("4".to_owned()));
        assert_eq!(CountType::from("Present").birdtrack_count("Y"), Some("1".to_owned()));
        assert_eq!(CountType::from("Estimate").birdtrack_count("50"), Some("c50".to_owned()));
        assert_eq!(
            CountType::from("Maximum count").birdtrack_count("Y"),
            Some("c1".to_owned())
        );
        assert_eq!(
            CountType::from("Minimum count").birdtrack_count("20"),
            Some("20+".to_owned())
        );

        let other = CountType::from("Guess");
        assert_eq!(other, CountType::Other("Guess".to_owned()));
        assert_eq!(other.birdtrack_count("3"), None);
    }

    #[test]
    fn test_activity_codes() {
        assert_eq!(Activity::from("Singing").breeding_code(), Some(2));
        assert_eq!(Activity::from("Nest building or excavating").breeding_code(), Some(9));
        assert_eq!(Activity::from("Nest under construction").breeding_code(), Some(9));
        assert_eq!(Activity::from("Hunting").breeding_code(), None);
        assert_eq!(Activity::from("Hunting").activity_code(), Some(1));

        let incubating = Activity::from("Adult observed incubating eggs/chicks");
        assert_eq!(incubating.breeding_code(), Some(16));
        assert_eq!(incubating.activity_code(), Some(7));

        let other = Activity::from("Preening");
        assert_eq!(other, Activity::Other("Preening".to_owned()));
        assert_eq!(other.breeding_code(), None);
        assert_eq!(other.activity_code(), None);
    }

    #[test]
    fn test_count_unit_codes() {
        assert_eq!(CountUnit::from("Pair").breeding_code(), Some(3));
        assert_eq!(CountUnit::from("Apparently occupied nest").breeding_code(), Some(13));
        assert_eq!(CountUnit::from("Adult(s) with brood").breeding_code(), Some(16));
        assert_eq!(CountUnit::from("Adult Female").sex(), Some('F'));
        assert_eq!(CountUnit::from("Individual"), CountUnit::Other("Individual".to_owned()));
    }
}
