//! In-process transport that hands requests straight to a [`ResourceEndpoint`].
//!
//! Requests still go through the full JSON encode/route/decode path, so the
//! controller sees exactly the responses a remote endpoint would produce.

use super::{ApiResult, Transport};
use crate::endpoint::policy::AuthorizationPolicy;
use crate::endpoint::ResourceEndpoint;
use crate::repo::contract_term_repo::ContractTermRepository;
use crate::wire::{ApiRequest, ApiResponse};

pub struct LocalTransport<R: ContractTermRepository, P: AuthorizationPolicy> {
    endpoint: ResourceEndpoint<R, P>,
}

impl<R: ContractTermRepository, P: AuthorizationPolicy> LocalTransport<R, P> {
    pub fn new(endpoint: ResourceEndpoint<R, P>) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &ResourceEndpoint<R, P> {
        &self.endpoint
    }
}

impl<R: ContractTermRepository, P: AuthorizationPolicy> Transport for LocalTransport<R, P> {
    fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        Ok(self.endpoint.handle(&request))
    }
}
