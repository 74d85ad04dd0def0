//! Identifier chains addressing entities in the hierarchy.
//!
//! Paths deserialise straight from URL segments, so HTTP handlers extract
//! them with `web::Path`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectPath {
    /// Project identifier.
    pub projectid: String,
}

/// Address of a sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SamplePath {
    /// Project identifier.
    pub projectid: String,
    /// Sample identifier within the project.
    pub sampleid: String,
}

/// Address of a libprep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibPrepPath {
    /// Project identifier.
    pub projectid: String,
    /// Sample identifier within the project.
    pub sampleid: String,
    /// Libprep identifier within the sample.
    pub libprepid: String,
}

/// Address of a seqrun.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqRunPath {
    /// Project identifier.
    pub projectid: String,
    /// Sample identifier within the project.
    pub sampleid: String,
    /// Libprep identifier within the sample.
    pub libprepid: String,
    /// Seqrun identifier within the libprep.
    pub seqrunid: String,
}

/// Libpreps of a project, optionally narrowed to one sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibPrepScope {
    /// Project identifier.
    pub projectid: String,
    /// Sample identifier within the project, when narrowed.
    #[serde(default)]
    pub sampleid: Option<String>,
}

/// Seqruns of a project, optionally narrowed to a sample and libprep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqRunScope {
    /// Project identifier.
    pub projectid: String,
    /// Sample identifier within the project, when narrowed.
    #[serde(default)]
    pub sampleid: Option<String>,
    /// Libprep identifier within the sample, when narrowed.
    #[serde(default)]
    pub libprepid: Option<String>,
}

impl ProjectPath {
    /// Path of project `projectid`.
    #[must_use]
    pub fn new(projectid: impl Into<String>) -> Self {
        Self {
            projectid: projectid.into(),
        }
    }

    /// Path of sample `sampleid` in this project.
    #[must_use]
    pub fn sample(&self, sampleid: impl Into<String>) -> SamplePath {
        SamplePath {
            projectid: self.projectid.clone(),
            sampleid: sampleid.into(),
        }
    }
}

impl SamplePath {
    /// Path of libprep `libprepid` in this sample.
    #[must_use]
    pub fn libprep(&self, libprepid: impl Into<String>) -> LibPrepPath {
        LibPrepPath {
            projectid: self.projectid.clone(),
            sampleid: self.sampleid.clone(),
            libprepid: libprepid.into(),
        }
    }
}

impl LibPrepPath {
    /// Path of seqrun `seqrunid` in this libprep.
    #[must_use]
    pub fn seqrun(&self, seqrunid: impl Into<String>) -> SeqRunPath {
        SeqRunPath {
            projectid: self.projectid.clone(),
            sampleid: self.sampleid.clone(),
            libprepid: self.libprepid.clone(),
            seqrunid: seqrunid.into(),
        }
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.projectid)
    }
}

impl fmt::Display for SamplePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.projectid, self.sampleid)
    }
}

impl fmt::Display for LibPrepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.projectid, self.sampleid, self.libprepid)
    }
}

impl fmt::Display for SeqRunPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.projectid, self.sampleid, self.libprepid, self.seqrunid
        )
    }
}
