use std::str::FromStr;

use common::prelude::{CannedAcl, ConfigError, Grantee, Permission};

use crate::diagnostics::{AttributePath, Diagnostic, Diagnostics};

fn check<T: FromStr<Err = ConfigError>>(
    value: &str,
    path: &AttributePath,
    valid: &str,
    noun: &str,
) -> Diagnostics {
    match value.parse::<T>() {
        Ok(_) => Diagnostics::new(),
        Err(_) => Diagnostic::error(
            format!("Wrong value. Valid Values: {}", valid),
            format!("{:?} is not a valid {}", value, noun),
        )
        .with_path(path.clone())
        .into(),
    }
}

/// An empty string stands for "no canned ACL"
pub fn canned_acl(value: &str, path: &AttributePath) -> Diagnostics {
    if value.is_empty() {
        return Diagnostics::new();
    }
    check::<CannedAcl>(value, path, CannedAcl::VALID, "canned ACL")
}

pub fn acl_user(value: &str, path: &AttributePath) -> Diagnostics {
    check::<Grantee>(value, path, Grantee::VALID, "ACL User")
}

pub fn acl_permission(value: &str, path: &AttributePath) -> Diagnostics {
    check::<Permission>(value, path, Permission::VALID, "ACL Permission")
}
