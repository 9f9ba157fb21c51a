use crate::domain::model::{DeathStatistics, PassengerRecord, Sex};

/// Death count and ratio (percent, two decimals) for one gender. Anything
/// other than "male" selects female passengers.
pub fn death_statistics(records: &[PassengerRecord], gender: &str) -> DeathStatistics {
    let sex = Sex::parse(gender);

    let (total, deaths) = records
        .iter()
        .filter(|r| r.sex.trim().eq_ignore_ascii_case(sex.as_str()))
        .fold((0usize, 0usize), |(total, deaths), r| {
            (total + 1, deaths + usize::from(r.survived == 0))
        });

    let death_ratio = if total > 0 {
        round2(deaths as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    DeathStatistics {
        gender: sex.label().to_string(),
        total,
        deaths,
        death_ratio,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(sex: &str, survived: u8) -> PassengerRecord {
        PassengerRecord {
            passenger_id: 0,
            survived,
            pclass: 3,
            sex: sex.to_string(),
            age: None,
            sib_sp: 0,
            parch: 0,
            embarked: None,
        }
    }

    #[test]
    fn test_ratio_rounds_to_two_decimals() {
        let records = vec![
            passenger("male", 0),
            passenger("male", 0),
            passenger("male", 1),
            passenger("female", 1),
        ];
        let stats = death_statistics(&records, "Male");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.deaths, 2);
        assert_eq!(stats.death_ratio, 66.67);
        assert_eq!(stats.gender, "Male");
    }

    #[test]
    fn test_empty_population_has_zero_ratio() {
        let only_men = vec![passenger("male", 0), passenger("male", 1)];
        for gender in ["female", "Female", "", "unknown"] {
            let stats = death_statistics(&only_men, gender);
            assert_eq!(stats.total, 0);
            assert_eq!(stats.death_ratio, 0.0);
        }
        assert_eq!(death_statistics(&[], "male").death_ratio, 0.0);
    }
}
