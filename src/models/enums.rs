use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the wire form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(MealRelation {
    Before => "antes",
    During => "durante",
    After => "después",
});

impl MealRelation {
    /// Lenient parse used for user input: accepts English names and the
    /// unaccented "despues".
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "antes" | "before" => Some(Self::Before),
            "durante" | "during" => Some(Self::During),
            "después" | "despues" | "after" => Some(Self::After),
            _ => None,
        }
    }
}

/// serde helper: `momento_comida` is either a relation or an empty string.
pub mod meal_relation_opt {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<MealRelation>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map(|m| m.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<MealRelation>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => MealRelation::parse_loose(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown meal relation: {s}"))),
        }
    }
}

// ═══════════════════════════════════════════
// Presentation
// ═══════════════════════════════════════════

/// Packaging of a medication. Drives the action verb and icon shown
/// next to each reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Presentation {
    Pills,
    Tablets,
    Syrup,
    Ampoule,
    Aerosol,
    Ointment,
    Cream,
    Drops,
    Other(String),
}

impl Presentation {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "pastillas" | "pastilla" => Self::Pills,
            "tabletas" | "tableta" => Self::Tablets,
            "jarabe" => Self::Syrup,
            "ampolla" | "ampollas" => Self::Ampoule,
            "aerosol" => Self::Aerosol,
            "pomada" => Self::Ointment,
            "crema" => Self::Cream,
            "gotas" => Self::Drops,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pills => "Pastillas",
            Self::Tablets => "Tabletas",
            Self::Syrup => "Jarabe",
            Self::Ampoule => "Ampolla",
            Self::Aerosol => "Aerosol",
            Self::Ointment => "Pomada",
            Self::Cream => "Crema",
            Self::Drops => "Gotas",
            Self::Other(label) => label,
        }
    }

    /// "Tomar" for things swallowed whole, "Aplicar" for things applied.
    pub fn action_verb(&self) -> &'static str {
        match self {
            Self::Pills | Self::Tablets => "Tomar",
            Self::Ampoule | Self::Aerosol | Self::Ointment | Self::Cream => "Aplicar",
            _ => "Usar",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pills | Self::Tablets | Self::Other(_) => "pill",
            Self::Ampoule => "needle",
            Self::Aerosol => "spray",
            Self::Ointment | Self::Cream => "tube",
            Self::Syrup => "bottle-tonic",
            Self::Drops => "water",
        }
    }
}

impl std::fmt::Display for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Presentation {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Presentation {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Self::parse(&raw))
    }
}

// ═══════════════════════════════════════════
// Frequency
// ═══════════════════════════════════════════

pub const DAILY_LABEL: &str = "Diaria";
pub const AS_NEEDED_LABEL: &str = "Según sea necesario";

/// The `frecuencia` label of a medication. The number of doses per day
/// lives in `dose_count`, not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Frequency {
    #[default]
    Unset,
    Daily,
    AsNeeded,
    Other(String),
}

impl Frequency {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Self::Unset;
        }
        match trimmed.to_lowercase().as_str() {
            "diaria" => Self::Daily,
            "según sea necesario" | "segun sea necesario" => Self::AsNeeded,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::Daily => DAILY_LABEL,
            Self::AsNeeded => AS_NEEDED_LABEL,
            Self::Other(label) => label,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.map(|r| Self::parse(&r)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn meal_relation_round_trip() {
        for (variant, s) in [
            (MealRelation::Before, "antes"),
            (MealRelation::During, "durante"),
            (MealRelation::After, "después"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(MealRelation::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_meal_relation_returns_error() {
        assert!(MealRelation::from_str("lunch").is_err());
        assert_eq!(MealRelation::parse_loose("Despues"), Some(MealRelation::After));
        assert_eq!(MealRelation::parse_loose("BEFORE"), Some(MealRelation::Before));
    }

    #[derive(Serialize, Deserialize)]
    struct MealHolder {
        #[serde(with = "meal_relation_opt", default)]
        meal: Option<MealRelation>,
    }

    #[test]
    fn empty_meal_relation_is_none() {
        let holder: MealHolder = serde_json::from_str(r#"{"meal":""}"#).unwrap();
        assert!(holder.meal.is_none());
        let holder: MealHolder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(holder.meal.is_none());
        assert_eq!(serde_json::to_string(&holder).unwrap(), r#"{"meal":""}"#);
    }

    #[test]
    fn unknown_meal_relation_is_rejected() {
        assert!(serde_json::from_str::<MealHolder>(r#"{"meal":"brunch"}"#).is_err());
    }

    #[test]
    fn presentation_verbs_and_icons() {
        assert_eq!(Presentation::parse("Pastillas").action_verb(), "Tomar");
        assert_eq!(Presentation::parse("ampollas").action_verb(), "Aplicar");
        assert_eq!(Presentation::parse("Jarabe").action_verb(), "Usar");
        assert_eq!(Presentation::parse("jarabe").icon(), "bottle-tonic");
        assert_eq!(Presentation::parse("CREMA").icon(), "tube");
        assert_eq!(Presentation::parse("parche").icon(), "pill");
    }

    #[test]
    fn presentation_keeps_unknown_label() {
        let p = Presentation::parse(" Parche ");
        assert_eq!(p, Presentation::Other("Parche".into()));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"Parche\"");
    }

    #[test]
    fn frequency_labels() {
        assert_eq!(Frequency::parse(""), Frequency::Unset);
        assert_eq!(Frequency::parse("Diaria"), Frequency::Daily);
        assert_eq!(Frequency::parse("Según sea necesario"), Frequency::AsNeeded);
        assert_eq!(
            Frequency::parse("2 veces al día"),
            Frequency::Other("2 veces al día".into())
        );
        assert!(!Frequency::Unset.is_set());
    }

    #[test]
    fn null_frequency_deserializes_as_unset() {
        let f: Frequency = serde_json::from_str("null").unwrap();
        assert_eq!(f, Frequency::Unset);
    }
}
