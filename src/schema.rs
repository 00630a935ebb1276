//! Canonical field catalogue and spreadsheet header mapping.
//!
//! This module owns the [`Field`] enum (the fourteen canonical record fields in
//! canonical order), their [`FieldKind`] coercion class, and the
//! [`SchemaMapper`] that reconciles spreadsheet headers with canonical fields.
//!
//! ## Responsibilities
//!
//! - Built-in header aliases, covering both historical part-number columns
//! - Required-field policy (`segment` is optional unless strict mode is on)
//! - Reverse lookup of display names for error messages and UI hints
//! - Optional YAML mapping profiles that extend the built-in aliases

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    fs::File,
    io::BufReader,
    path::Path,
    str::FromStr,
};

use anyhow::{Context, Result, anyhow, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Pn,
    Description,
    QuantiteMoyenne,
    NombreVisites,
    FrequenceTotale,
    FrequenceNrc,
    FrequenceAog,
    PercentNrc,
    PercentAog,
    ScoreCriticite,
    AcReg,
    Annee,
    Urgency,
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Float,
    Integer,
    /// Optional integer year; blank or malformed cells stay absent.
    Year,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Pn,
        Field::Description,
        Field::QuantiteMoyenne,
        Field::NombreVisites,
        Field::FrequenceTotale,
        Field::FrequenceNrc,
        Field::FrequenceAog,
        Field::PercentNrc,
        Field::PercentAog,
        Field::ScoreCriticite,
        Field::AcReg,
        Field::Annee,
        Field::Urgency,
        Field::Segment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Pn => "pn",
            Field::Description => "description",
            Field::QuantiteMoyenne => "quantite_moyenne",
            Field::NombreVisites => "nombre_visites",
            Field::FrequenceTotale => "frequence_totale",
            Field::FrequenceNrc => "frequence_nrc",
            Field::FrequenceAog => "frequence_aog",
            Field::PercentNrc => "percent_nrc",
            Field::PercentAog => "percent_aog",
            Field::ScoreCriticite => "score_criticite",
            Field::AcReg => "ac_reg",
            Field::Annee => "annee",
            Field::Urgency => "urgency",
            Field::Segment => "segment",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Pn | Field::Description | Field::AcReg | Field::Urgency | Field::Segment => {
                FieldKind::Text
            }
            Field::QuantiteMoyenne
            | Field::PercentNrc
            | Field::PercentAog
            | Field::ScoreCriticite => FieldKind::Float,
            Field::NombreVisites
            | Field::FrequenceTotale
            | Field::FrequenceNrc
            | Field::FrequenceAog => FieldKind::Integer,
            Field::Annee => FieldKind::Year,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| anyhow!("Unknown canonical field '{value}'"))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::Text => "Text",
            FieldKind::Float => "Float",
            FieldKind::Integer => "Integer",
            FieldKind::Year => "Year",
        };
        f.write_str(label)
    }
}

const BUILTIN_ALIASES: &[(&str, Field)] = &[
    ("Réfèrence pièce", Field::Pn),
    ("PN", Field::Pn),
    ("Description", Field::Description),
    ("Quantité Moyenne", Field::QuantiteMoyenne),
    ("Nombre de visites", Field::NombreVisites),
    ("Fréquence totale", Field::FrequenceTotale),
    ("Fréquence NRC", Field::FrequenceNrc),
    ("Fréquence AOG", Field::FrequenceAog),
    ("% NRC", Field::PercentNrc),
    ("% AOG", Field::PercentAog),
    ("Score de criticité", Field::ScoreCriticite),
    ("A/C REG", Field::AcReg),
    ("Année", Field::Annee),
    ("URGENCY", Field::Urgency),
    ("Segment", Field::Segment),
];

const REQUIRED_FIELDS: &[Field] = &[Field::Pn, Field::Description, Field::ScoreCriticite];

/// Outcome of resolving one spreadsheet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Canonical(Field),
    /// Unrecognized header, passed through trimmed.
    Passthrough(&'a str),
}

impl Resolved<'_> {
    pub fn name(&self) -> &str {
        match self {
            Resolved::Canonical(field) => field.as_str(),
            Resolved::Passthrough(name) => name,
        }
    }

    pub fn field(&self) -> Option<Field> {
        match self {
            Resolved::Canonical(field) => Some(*field),
            Resolved::Passthrough(_) => None,
        }
    }
}

/// Extra aliases and policy loaded from a YAML profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingProfile {
    #[serde(default)]
    pub require_segment: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, Field>,
}

impl MappingProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Opening mapping profile {path:?}"))?;
        let reader = BufReader::new(file);
        let profile: MappingProfile =
            serde_yaml::from_reader(reader).context("Parsing mapping profile YAML")?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        for header in self.aliases.keys() {
            ensure!(
                !header.trim().is_empty(),
                "Mapping profile contains an empty header alias"
            );
            ensure!(
                header.trim() == header,
                "Header alias '{header}' must not carry surrounding whitespace"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SchemaMapper {
    aliases: Vec<(String, Field)>,
    require_segment: bool,
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaMapper {
    pub fn new() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|(name, field)| (name.to_string(), *field))
                .collect(),
            require_segment: false,
        }
    }

    /// Mapper built from the optional profile path and the strict-segment flag.
    pub fn from_options(profile: Option<&Path>, require_segment: bool) -> Result<Self> {
        let mut mapper = Self::new().require_segment(require_segment);
        if let Some(path) = profile {
            let profile = MappingProfile::load(path)
                .with_context(|| format!("Loading mapping profile from {path:?}"))?;
            mapper = mapper.with_profile(&profile);
        }
        Ok(mapper)
    }

    /// Mapper that also requires the `Segment` column.
    pub fn strict() -> Self {
        Self::new().require_segment(true)
    }

    pub fn require_segment(mut self, required: bool) -> Self {
        self.require_segment = required;
        self
    }

    pub fn with_profile(mut self, profile: &MappingProfile) -> Self {
        for (header, field) in &profile.aliases {
            if !self.aliases.iter().any(|(name, _)| name == header) {
                self.aliases.push((header.clone(), *field));
            }
        }
        self.require_segment |= profile.require_segment;
        self
    }

    pub fn resolve<'a>(&self, external: &'a str) -> Resolved<'a> {
        let trimmed = external.trim();
        if let Some((_, field)) = self.aliases.iter().find(|(name, _)| name == trimmed) {
            return Resolved::Canonical(*field);
        }
        match Field::from_str(trimmed) {
            Ok(field) => Resolved::Canonical(field),
            Err(_) => Resolved::Passthrough(trimmed),
        }
    }

    pub fn required_fields(&self) -> BTreeSet<Field> {
        let mut required = REQUIRED_FIELDS.iter().copied().collect::<BTreeSet<_>>();
        if self.require_segment {
            required.insert(Field::Segment);
        }
        required
    }

    pub fn is_required(&self, field: Field) -> bool {
        self.required_fields().contains(&field)
    }

    pub fn original_names_for(&self, field: Field) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, mapped)| *mapped == field)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// First spreadsheet name for `field`, or the canonical name if none is known.
    pub fn display_name(&self, field: Field) -> String {
        self.original_names_for(field)
            .first()
            .map(|name| name.to_string())
            .unwrap_or_else(|| field.as_str().to_string())
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, Field)> {
        self.aliases.iter().map(|(name, field)| (name.as_str(), *field))
    }
}
