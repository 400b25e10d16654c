// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

/// A named set of roles allowed through a route.
pub trait RoleGuard: Send + Sync + 'static {
    const NAME: &'static str;
    const ROLES: &'static [Role];
}

/// Rejects the request with 403 unless the caller holds one of `T::ROLES`.
/// Must run behind `auth_guard`.
pub struct RequireRole<T>(pub User, PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleGuard,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        check::<T>(&user)?;
        Ok(RequireRole(user, PhantomData))
    }
}

fn check<T: RoleGuard>(user: &User) -> Result<(), AppError> {
    if user.has_role(T::ROLES) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "This action requires the {} role set; you are '{}'.",
            T::NAME,
            user.role.as_str()
        )))
    }
}

pub struct AdminOnly;
impl RoleGuard for AdminOnly {
    const NAME: &'static str = "admin";
    const ROLES: &'static [Role] = &[Role::Admin];
}

pub struct MaintenanceStaff;
impl RoleGuard for MaintenanceStaff {
    const NAME: &'static str = "maintenance";
    const ROLES: &'static [Role] = &[Role::Admin, Role::Engineer];
}

pub struct EnergyStaff;
impl RoleGuard for EnergyStaff {
    const NAME: &'static str = "energy";
    const ROLES: &'static [Role] = &[Role::Admin, Role::Utility, Role::Engineer];
}

pub struct DocumentEditors;
impl RoleGuard for DocumentEditors {
    const NAME: &'static str = "document";
    const ROLES: &'static [Role] = &[Role::Admin, Role::Qac, Role::Engineer];
}

pub struct AuditReaders;
impl RoleGuard for AuditReaders {
    const NAME: &'static str = "audit";
    const ROLES: &'static [Role] = &[Role::Admin, Role::Qac];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lifecycle::fixtures::user;

    #[test]
    fn role_sets() {
        assert!(check::<AdminOnly>(&user(Role::Admin)).is_ok());
        assert!(matches!(check::<AdminOnly>(&user(Role::Engineer)), Err(AppError::Forbidden(_))));

        assert!(check::<MaintenanceStaff>(&user(Role::Engineer)).is_ok());
        assert!(check::<MaintenanceStaff>(&user(Role::Utility)).is_err());

        assert!(check::<EnergyStaff>(&user(Role::Utility)).is_ok());
        assert!(check::<EnergyStaff>(&user(Role::Requester)).is_err());

        assert!(check::<DocumentEditors>(&user(Role::Qac)).is_ok());
        assert!(check::<AuditReaders>(&user(Role::Qac)).is_ok());
        assert!(check::<AuditReaders>(&user(Role::Engineer)).is_err());
    }
}
