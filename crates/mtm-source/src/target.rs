use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// A framework the compiler can emit code for.
///
/// Names are matched case-insensitively wherever they are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Target {
    #[serde(rename = "reactjs")]
    React,
    #[serde(rename = "vue")]
    Vue,
    #[serde(rename = "svelte")]
    Svelte,
    #[serde(rename = "solid")]
    Solid,
}

impl Target {
    pub const ALL: [Target; 4] = [Target::React, Target::Vue, Target::Svelte, Target::Solid];

    /// Name used in frontmatter and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Target::React => "reactjs",
            Target::Vue => "vue",
            Target::Svelte => "svelte",
            Target::Solid => "solid",
        }
    }

    /// File extension of the generated component.
    pub fn extension(&self) -> &'static str {
        match self {
            Target::React | Target::Solid => "jsx",
            Target::Vue => "vue",
            Target::Svelte => "svelte",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reactjs" | "react" => Ok(Target::React),
            "vue" => Ok(Target::Vue),
            "svelte" => Ok(Target::Svelte),
            "solid" | "solidjs" => Ok(Target::Solid),
            other => Err(format!(
                "unknown target framework '{}' (expected one of: reactjs, vue, svelte, solid)",
                other
            )),
        }
    }
}
