//! Binary package format classification.

use serde::Serialize;

/// Package family of a resolved artifact, decided by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    Rpm,
    Deb,
    /// Archive, binary or anything the system package manager does not own
    #[default]
    Other,
}

impl PackageFormat {
    pub fn classify(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".rpm") {
            PackageFormat::Rpm
        } else if lower.ends_with(".deb") {
            PackageFormat::Deb
        } else {
            PackageFormat::Other
        }
    }

    pub fn is_rpm(self) -> bool {
        self == PackageFormat::Rpm
    }

    pub fn is_deb(self) -> bool {
        self == PackageFormat::Deb
    }

    /// RPM and DEB artifacts belong to the local package repository
    pub fn is_system_package(self) -> bool {
        matches!(self, PackageFormat::Rpm | PackageFormat::Deb)
    }
}
