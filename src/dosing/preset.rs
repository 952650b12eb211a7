use chrono::NaiveTime;

use crate::models::{Dose, Frequency, MealRelation};

/// Options offered by the "how often do you take it?" step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencyPreset {
    OnceDaily,
    TwiceDaily,
    ThreeTimesDaily,
    /// No reminders.
    AsNeeded,
    /// Free-form schedule; doses are entered by hand.
    Other(String),
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

impl FrequencyPreset {
    /// Parse a CLI/user choice: a count, "once"/"twice"/"thrice", the
    /// option's own label, "as-needed", or anything else as a custom label.
    pub fn parse(choice: &str) -> Self {
        match choice.trim().to_lowercase().as_str() {
            "1" | "once" | "una" | "una vez al día" => Self::OnceDaily,
            "2" | "twice" | "dos" | "dos veces al día" => Self::TwiceDaily,
            "3" | "thrice" | "tres" | "tres veces al día" => Self::ThreeTimesDaily,
            "as-needed" | "prn" | "según sea necesario" | "segun sea necesario" => Self::AsNeeded,
            _ => Self::Other(choice.trim().to_string()),
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            Self::OnceDaily | Self::TwiceDaily | Self::ThreeTimesDaily => Frequency::Daily,
            Self::AsNeeded => Frequency::AsNeeded,
            Self::Other(label) => Frequency::parse(label),
        }
    }

    pub fn dose_count(&self) -> usize {
        match self {
            Self::OnceDaily => 1,
            Self::TwiceDaily => 2,
            Self::ThreeTimesDaily => 3,
            Self::AsNeeded | Self::Other(_) => 0,
        }
    }

    /// Default doses written into the draft when this option is picked.
    pub fn template(&self) -> Vec<Dose> {
        use MealRelation::{After, Before, During};
        match self {
            Self::OnceDaily => vec![Dose::new(1, at(8, 0), 1, Some(Before))],
            Self::TwiceDaily => vec![
                Dose::new(1, at(8, 0), 1, Some(Before)),
                Dose::new(2, at(20, 0), 1, Some(After)),
            ],
            Self::ThreeTimesDaily => vec![
                Dose::new(1, at(8, 0), 2, Some(Before)),
                Dose::new(2, at(14, 0), 1, Some(During)),
                Dose::new(3, at(20, 0), 1, Some(After)),
            ],
            Self::AsNeeded | Self::Other(_) => Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::OnceDaily => "Una vez al día",
            Self::TwiceDaily => "Dos veces al día",
            Self::ThreeTimesDaily => "Tres veces al día",
            Self::AsNeeded => "Según sea necesario (sin recordatorio)",
            Self::Other(label) => label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twice_daily_template_matches_selection_screen() {
        let doses = FrequencyPreset::TwiceDaily.template();
        assert_eq!(doses.len(), 2);
        assert_eq!(doses[0].time_label(), "08:00");
        assert_eq!(doses[0].meal_relation, Some(MealRelation::Before));
        assert_eq!(doses[1].time_label(), "20:00");
        assert_eq!(doses[1].meal_relation, Some(MealRelation::After));
        assert!(doses.iter().all(|d| d.quantity == 1 && !d.administered));
    }

    #[test]
    fn three_times_daily_starts_with_double_dose() {
        let doses = FrequencyPreset::ThreeTimesDaily.template();
        assert_eq!(
            doses.iter().map(|d| d.quantity).collect::<Vec<_>>(),
            vec![2, 1, 1]
        );
        assert_eq!(doses[1].meal_relation, Some(MealRelation::During));
    }

    #[test]
    fn template_length_matches_count() {
        for preset in [
            FrequencyPreset::OnceDaily,
            FrequencyPreset::TwiceDaily,
            FrequencyPreset::ThreeTimesDaily,
            FrequencyPreset::AsNeeded,
            FrequencyPreset::Other("cada 8 horas".into()),
        ] {
            assert_eq!(preset.template().len(), preset.dose_count());
        }
    }

    #[test]
    fn parse_choices() {
        assert_eq!(FrequencyPreset::parse("2"), FrequencyPreset::TwiceDaily);
        assert_eq!(
            FrequencyPreset::parse("Tres veces al día"),
            FrequencyPreset::ThreeTimesDaily
        );
        assert_eq!(FrequencyPreset::parse("As-Needed"), FrequencyPreset::AsNeeded);
        assert_eq!(
            FrequencyPreset::parse("cada 8 horas"),
            FrequencyPreset::Other("cada 8 horas".into())
        );
        assert_eq!(FrequencyPreset::AsNeeded.frequency(), Frequency::AsNeeded);
        assert_eq!(FrequencyPreset::OnceDaily.frequency(), Frequency::Daily);
    }
}
