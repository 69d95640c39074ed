use serde::{Deserialize, Serialize};

use crate::profile::TypingProfile;

pub const PLAN_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub version: u32,
    pub profile: TypingProfile,
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn new(profile: TypingProfile) -> Self {
        Self {
            version: PLAN_VERSION,
            profile,
            actions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Wait { ms: u64 },
    Type { ch: char },
    Erase,
}
