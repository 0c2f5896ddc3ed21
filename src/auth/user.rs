use std::future::Future;

use crate::request::Request;

/// User lookup collaborator, typically backed by the application's model layer.
pub trait UserProvider: Send + Sync {
    type User: Send;
    type Error: Send;

    fn find_by_id(&self, id: u64) -> impl Future<Output = Result<Option<Self::User>, Self::Error>> + Send;
}

/// The user behind the request's session token.
///
/// `Ok(None)` for anonymous requests and for tokens whose user no longer
/// exists; a lookup failure is returned as-is.
pub async fn current_user<P: UserProvider>(
    req: &Request,
    provider: &P,
) -> Result<Option<P::User>, P::Error> {
    let auth = req.auth();
    match auth.user_id {
        Some(id) if auth.authenticated => provider.find_by_id(id).await,
        _ => Ok(None),
    }
}
