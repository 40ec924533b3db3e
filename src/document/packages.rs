//! Constraint package management
//!
//! Raw documents may carry any number of default flags. These operations keep
//! exactly one default package per node: whenever an edit would leave none,
//! the first remaining package is promoted.

use thiserror::Error;

use super::node::{Constraint, ConstraintPackage, Node};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageError {
    #[error("node '{node_id}' has no constraint package '{package_id}'")]
    NotFound { node_id: String, package_id: String },

    #[error("node '{node_id}' already has a constraint package '{package_id}'")]
    Duplicate { node_id: String, package_id: String },
}

impl Node {
    /// The package driving layout: the first flagged default, if any
    pub fn default_package(&self) -> Option<&ConstraintPackage> {
        self.constraint_packages.iter().find(|p| p.is_default)
    }

    /// Constraints of the default package; empty if there is none
    pub fn default_constraints(&self) -> &[Constraint] {
        self.default_package()
            .map(|p| p.constraints.as_slice())
            .unwrap_or(&[])
    }

    /// Append a package. The first package a node receives becomes its default.
    pub fn add_package(&mut self, mut package: ConstraintPackage) -> Result<(), PackageError> {
        if self.package_index(&package.id).is_some() {
            return Err(PackageError::Duplicate {
                node_id: self.id.to_string(),
                package_id: package.id,
            });
        }
        if package.is_default {
            self.clear_default_flags();
        }
        package.is_default = package.is_default || self.constraint_packages.is_empty();
        self.constraint_packages.push(package);
        Ok(())
    }

    /// Remove a package, promoting the first remaining one if the default went away
    pub fn remove_package(&mut self, package_id: &str) -> Result<ConstraintPackage, PackageError> {
        let index = self.require_package(package_id)?;
        let removed = self.constraint_packages.remove(index);
        self.ensure_default();
        Ok(removed)
    }

    /// Make `package_id` the only default package
    pub fn set_default_package(&mut self, package_id: &str) -> Result<(), PackageError> {
        let index = self.require_package(package_id)?;
        self.clear_default_flags();
        self.constraint_packages[index].is_default = true;
        Ok(())
    }

    /// Flip the default flag. Turning off the sole default promotes the first
    /// package, which may be the same one.
    pub fn toggle_default(&mut self, package_id: &str) -> Result<(), PackageError> {
        let index = self.require_package(package_id)?;
        if self.constraint_packages[index].is_default {
            self.constraint_packages[index].is_default = false;
            self.ensure_default();
        } else {
            self.clear_default_flags();
            self.constraint_packages[index].is_default = true;
        }
        Ok(())
    }

    /// Restore the exactly-one-default invariant without touching a valid state
    pub fn ensure_default(&mut self) {
        let mut seen = false;
        for package in &mut self.constraint_packages {
            if package.is_default {
                package.is_default = !seen;
                seen = true;
            }
        }
        if !seen {
            if let Some(first) = self.constraint_packages.first_mut() {
                first.is_default = true;
            }
        }
    }

    fn clear_default_flags(&mut self) {
        for package in &mut self.constraint_packages {
            package.is_default = false;
        }
    }

    fn package_index(&self, package_id: &str) -> Option<usize> {
        self.constraint_packages
            .iter()
            .position(|p| p.id == package_id)
    }

    fn require_package(&self, package_id: &str) -> Result<usize, PackageError> {
        self.package_index(package_id)
            .ok_or_else(|| PackageError::NotFound {
                node_id: self.id.to_string(),
                package_id: package_id.to_string(),
            })
    }
}
