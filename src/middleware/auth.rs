use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    error::AppError, repository::RoleRepository, services::auth_service::verify_token,
    state::AppState,
};

/// Caller identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Caller holding the admin role. Roles are read from the store on every
/// request, so revoking the role takes effect immediately.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

pub fn ensure_role(roles: &[String], role: &str) -> Result<(), AppError> {
    if !roles.iter().any(|r| r == role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_str = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?
        .trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = verify_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser { user_id })
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { user_id } = AuthUser::from_request_parts(parts, state).await?;
        let roles = state.roles().names_for_user(user_id).await?;
        if let Err(err) = ensure_role(&roles, &state.config.admin_role) {
            tracing::warn!(user_id = %user_id, "admin route refused");
            return Err(err);
        }
        Ok(AdminUser { user_id, roles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/admin/categories");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_requires_scheme() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc"))).unwrap(), "abc");
        assert!(matches!(
            bearer_token(&parts(Some("Basic abc"))),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            bearer_token(&parts(Some("Bearer  "))),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(bearer_token(&parts(None)), Err(AppError::Unauthorized)));
    }

    #[test]
    fn ensure_role_checks_membership() {
        let roles = vec!["client".to_string(), "admin".to_string()];
        assert!(ensure_role(&roles, "admin").is_ok());
        assert!(matches!(
            ensure_role(&roles[..1], "admin"),
            Err(AppError::Forbidden)
        ));
    }
}
