//! Authorization boundary: whether the current user may run a command.

use std::collections::HashSet;

pub trait Authorizer: Send + Sync {
    fn can_perform(&self, command: &str) -> bool;
}

/// Permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_perform(&self, _command: &str) -> bool {
        true
    }
}

/// Permits the commands it was built with.
#[derive(Debug, Clone, Default)]
pub struct CommandPermissions {
    allowed: HashSet<String>,
}

impl CommandPermissions {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: commands.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for CommandPermissions {
    fn can_perform(&self, command: &str) -> bool {
        self.allowed.contains(command)
    }
}
