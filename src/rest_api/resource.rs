//! Resource kinds exposed by the REST API

use std::fmt;

use super::collection::Expansion;

/// Fields inlined from a referenced bootcamp
const BOOTCAMP_SUMMARY: [&str; 2] = ["name", "description"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Bootcamps,
    Courses,
    Reviews,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Bootcamps,
        Resource::Courses,
        Resource::Reviews,
        Resource::Users,
    ];

    /// Backing collection name, also the URL segment
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Bootcamps => "bootcamps",
            Resource::Courses => "courses",
            Resource::Reviews => "reviews",
            Resource::Users => "users",
        }
    }

    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.collection() == name)
    }

    /// Fields whose values must be unique across the collection
    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            Resource::Bootcamps => &["name"],
            Resource::Users => &["email"],
            Resource::Courses | Resource::Reviews => &[],
        }
    }

    /// References resolved when records are read
    pub fn expansions(&self) -> Vec<Expansion> {
        match self {
            Resource::Courses | Resource::Reviews => vec![Expansion::new(
                "bootcamp",
                Resource::Bootcamps.collection(),
                &BOOTCAMP_SUMMARY,
            )],
            Resource::Bootcamps | Resource::Users => Vec::new(),
        }
    }

    /// Whether records of this kind belong to a bootcamp
    pub fn is_bootcamp_child(&self) -> bool {
        matches!(self, Resource::Courses | Resource::Reviews)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}
