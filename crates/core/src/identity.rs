use crate::domain::{Member, MemberSource};
use crate::error::BackupError;
use crate::ports::Result;
use std::collections::HashMap;

/// Mapping from user identifier to display name, built once per channel pass.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    names: HashMap<String, String>,
}

impl IdentityMap {
    pub fn lookup(&self, id: &str) -> Result<&str> {
        self.names
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| BackupError::UnknownIdentifier(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<Member> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|member| (member.id, member.display_name))
                .collect(),
        }
    }
}

/// Picks the display name, falling back to the real name.
pub fn to_member(source: &MemberSource) -> Result<Member> {
    let profile = &source.profile;
    let name = if !profile.display_name.is_empty() {
        &profile.display_name
    } else {
        &profile.real_name
    };
    if name.is_empty() {
        return Err(BackupError::EmptyDisplayName(source.id.clone()));
    }
    Ok(Member {
        id: source.id.clone(),
        display_name: name.clone(),
    })
}

pub fn resolve(members: &[MemberSource]) -> Result<IdentityMap> {
    members.iter().map(to_member).collect()
}
