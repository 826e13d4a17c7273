use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

pub const MEMBER_HEADER: &str = "x-member-id";

/// The member a request acts for. Sign-in happens upstream; by the time a
/// request reaches this service the member id travels in `X-Member-Id`.
#[derive(Clone, Debug)]
pub struct MemberSession {
    pub member_id: String,
}

impl FromRequestParts<Arc<AppState>> for MemberSession {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let member_id = member_id_from(parts);

        async move {
            let member_id = member_id.ok_or_else(|| {
                AppError::Unauthorized("No member session provided".to_string())
            })?;
            Ok(MemberSession { member_id })
        }
    }
}

/// Pages that also render for visitors take `Option<MemberSession>`.
impl OptionalFromRequestParts<Arc<AppState>> for MemberSession {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let session = member_id_from(parts).map(|member_id| MemberSession { member_id });
        async move { Ok(session) }
    }
}

fn member_id_from(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(MEMBER_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
