//! Configuration: domains, entity kinds and conversion options.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConverterError, Result};

/// Root-level grouping element.
pub const GROUP_TAG: &str = "Group";

/// Header element of a group.
pub const GROUP_HEADER_TAG: &str = "GroupHeader";

/// Suffix of the derived update-date column.
pub const UPDATE_DATE_SUFFIX: &str = "UpdateDate";

/// Suffix of the derived paragraph column.
pub const PARS_SUFFIX: &str = "PARs";

/// Nested group headers whose sections belong to a country record.
pub const COUNTRY_GROUP_HEADERS: [&str; 2] = ["General Information", "General Marine Information"];

/// Header of the country section that holds a date → name list.
pub const HOLIDAYS_HEADER: &str = "Holidays";

/// Kind of top-level entity in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Port,
    Country,
}

impl EntityKind {
    /// XML tag of the entity element.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Port => "Port",
            Self::Country => "Country",
        }
    }

    /// Identity child elements, in output column order.
    #[must_use]
    pub fn identity_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Port => &["PortName", "PortID", "WorldPortNumber"],
            Self::Country => &["CountryName", "CountryCode"],
        }
    }

    /// Headers of nested groups whose sections are read.
    ///
    /// Ports carry their sections directly and have no nested groups.
    #[must_use]
    pub fn nested_group_headers(&self) -> &'static [&'static str] {
        match self {
            Self::Port => &[],
            Self::Country => &COUNTRY_GROUP_HEADERS,
        }
    }

    /// Section header normalized as a key/value list, if any.
    #[must_use]
    pub fn key_value_header(&self) -> Option<&'static str> {
        match self {
            Self::Port => None,
            Self::Country => Some(HOLIDAYS_HEADER),
        }
    }
}

/// One of the source datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Berths and cargo handling per port.
    BerthsAndCargo,

    /// Navigational notes per port.
    Navigation,

    /// General and marine information per country.
    PortCountries,
}

impl Domain {
    /// All domains, in display order.
    pub const ALL: [Domain; 3] = [Self::BerthsAndCargo, Self::Navigation, Self::PortCountries];

    /// Kebab-case name used on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BerthsAndCargo => "berths-and-cargo",
            Self::Navigation => "navigation",
            Self::PortCountries => "port-countries",
        }
    }

    /// Entity kind found in this domain's documents.
    #[must_use]
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::BerthsAndCargo | Self::Navigation => EntityKind::Port,
            Self::PortCountries => EntityKind::Country,
        }
    }

    /// Input file used when none is given.
    #[must_use]
    pub fn default_input(&self) -> &'static str {
        match self {
            Self::BerthsAndCargo => "BerthsandCargo.xml",
            Self::Navigation => "Navigation.xml",
            Self::PortCountries => "PortCountries.xml",
        }
    }

    /// Output file used when none is given.
    #[must_use]
    pub fn default_output(&self) -> &'static str {
        match self {
            Self::BerthsAndCargo => "BerthsandCargo.csv",
            Self::Navigation => "Navigation.csv",
            Self::PortCountries => "PortCountries.csv",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str() == s)
            .ok_or_else(|| ConverterError::UnknownDomain(s.to_string()))
    }
}

/// What to do with an entity that lacks a required identity element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingIdentityPolicy {
    /// Abort the run.
    #[default]
    Fail,

    /// Drop the entity and record a warning.
    Skip,
}

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub domain: Domain,
    pub input: PathBuf,
    pub output: PathBuf,

    /// When set, the flat table is stored here and read back before exploding.
    pub intermediate: Option<PathBuf>,

    pub missing_identity: MissingIdentityPolicy,
}

impl ConvertOptions {
    /// Options with the domain's default file pair.
    #[must_use]
    pub fn for_domain(domain: Domain) -> Self {
        Self {
            domain,
            input: PathBuf::from(domain.default_input()),
            output: PathBuf::from(domain.default_output()),
            intermediate: None,
            missing_identity: MissingIdentityPolicy::default(),
        }
    }

    /// Override the input path.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Override the output path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Route the flat table through an intermediate CSV file.
    #[must_use]
    pub fn with_intermediate(mut self, path: impl Into<PathBuf>) -> Self {
        self.intermediate = Some(path.into());
        self
    }

    /// Set the missing identity policy.
    #[must_use]
    pub fn with_missing_identity(mut self, policy: MissingIdentityPolicy) -> Self {
        self.missing_identity = policy;
        self
    }
}

/// One entry of a job file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    pub domain: Domain,
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub intermediate: Option<PathBuf>,
    #[serde(default)]
    pub skip_invalid: bool,
}

impl JobSpec {
    /// Resolve into conversion options; relative paths are taken from `base_dir`.
    #[must_use]
    pub fn to_options(&self, base_dir: &Path) -> ConvertOptions {
        let resolve = |path: &Path| base_dir.join(path);
        let mut options = ConvertOptions::for_domain(self.domain);
        options.input = resolve(self.input.as_deref().unwrap_or(&options.input));
        options.output = resolve(self.output.as_deref().unwrap_or(&options.output));
        options.intermediate = self.intermediate.as_deref().map(resolve);
        if self.skip_invalid {
            options.missing_identity = MissingIdentityPolicy::Skip;
        }
        options
    }
}

/// A YAML file listing conversions to run in order.
///
/// ```yaml
/// jobs:
///   - domain: navigation
///   - domain: port-countries
///     input: data/PortCountries.xml
///     skip_invalid: true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<JobSpec>,
}

impl JobFile {
    /// Parse a job file from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Load a job file and resolve every job relative to the file's directory.
    pub fn load(path: &Path) -> Result<Vec<ConvertOptions>> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConverterError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConverterError::Io(e),
        })?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        let file = Self::from_yaml(&text)?;
        Ok(file.jobs.iter().map(|job| job.to_options(base_dir)).collect())
    }
}
