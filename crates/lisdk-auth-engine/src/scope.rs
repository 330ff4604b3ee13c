//! Requested permissions.
//!
//! The provider app expects the requested permissions as one string with the
//! identifiers separated by single spaces, in the order the host listed
//! them. Duplicates are dropped, keeping the first occurrence.

use std::fmt;

/// Permission identifiers understood by the provider app.
pub mod permission {
    pub const R_BASICPROFILE: &str = "r_basicprofile";
    pub const R_FULLPROFILE: &str = "r_fullprofile";
    pub const R_EMAILADDRESS: &str = "r_emailaddress";
    pub const R_CONTACTINFO: &str = "r_contactinfo";
    pub const RW_COMPANY_ADMIN: &str = "rw_company_admin";
    pub const W_SHARE: &str = "w_share";
}

/// An ordered, de-duplicated set of permission identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    permissions: Vec<String>,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope from permissions in the order given.
    pub fn build<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        permissions.into_iter().collect()
    }

    /// Add a permission, returning the scope. Already-present permissions
    /// keep their original position.
    pub fn with(mut self, permission: impl Into<String>) -> Self {
        self.push(permission);
        self
    }

    /// Add a permission in place.
    pub fn push(&mut self, permission: impl Into<String>) {
        let permission = permission.into();
        if !self.permissions.contains(&permission) {
            self.permissions.push(permission);
        }
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// The wire form: permissions joined by a single space.
    pub fn to_wire(&self) -> String {
        self.permissions.join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut scope = Self::new();
        for permission in iter {
            scope.push(permission);
        }
        scope
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::permission::*;
    use super::*;

    #[test]
    fn wire_form_preserves_insertion_order() {
        let scope = Scope::build([R_BASICPROFILE, R_FULLPROFILE]);
        assert_eq!(scope.to_wire(), "r_basicprofile r_fullprofile");

        let scope = Scope::build([R_FULLPROFILE, R_BASICPROFILE]);
        assert_eq!(scope.to_wire(), "r_fullprofile r_basicprofile");
    }

    #[test]
    fn empty_scope_is_empty_string() {
        let scope = Scope::new();
        assert!(scope.is_empty());
        assert_eq!(scope.to_wire(), "");
        assert_eq!(Scope::build(Vec::<String>::new()).to_wire(), "");
    }

    #[test]
    fn duplicates_keep_first_position() {
        let scope = Scope::build([W_SHARE, R_EMAILADDRESS, W_SHARE, R_CONTACTINFO]);
        assert_eq!(scope.to_wire(), "w_share r_emailaddress r_contactinfo");
        assert_eq!(scope.permissions().len(), 3);
    }

    #[test]
    fn builder_style() {
        let scope = Scope::new()
            .with(R_BASICPROFILE)
            .with(RW_COMPANY_ADMIN)
            .with(R_BASICPROFILE);
        assert_eq!(scope.to_string(), "r_basicprofile rw_company_admin");
    }

    #[test]
    fn single_permission_has_no_separator() {
        assert_eq!(Scope::build([R_BASICPROFILE]).to_wire(), "r_basicprofile");
    }
}
