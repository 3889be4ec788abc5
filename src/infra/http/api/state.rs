use std::sync::Arc;

use crate::application::accounts::AccountService;
use crate::cache::ComicInfoCache;
use crate::infra::credentials::CredentialCodec;

#[derive(Clone)]
pub struct ApiState {
    pub comics: Arc<ComicInfoCache>,
    pub accounts: Arc<AccountService>,
    pub credentials: Arc<CredentialCodec>,
}
