//! Driving ports: one trait per kind of application operation.
//!
//! Inbound adapters hold these as trait objects and never see the
//! validation, transaction and persistence layers composed behind them.

use async_trait::async_trait;

use crate::domain::Error;

/// An operation that changes persisted state.
#[async_trait]
pub trait MutationUseCase<Req: Send + 'static, Resp: Send + 'static>: Send + Sync {
    async fn execute(&self, request: Req) -> Result<Resp, Error>;
}

/// A read-only operation.
#[async_trait]
pub trait QueryUseCase<Req: Send + 'static, Resp: Send + 'static>: Send + Sync {
    async fn execute(&self, request: Req) -> Result<Resp, Error>;
}

/// Synchronous request checks that run before any transaction opens.
///
/// The method is not `async`, so implementations cannot await storage.
pub trait CheapValidator<Req: 'static>: Send + Sync {
    /// Reject malformed requests with an [`ErrorCode::InvalidRequest`](crate::domain::ErrorCode::InvalidRequest) error.
    fn validate_cheap(&self, request: &Req) -> Result<(), Error>;
}

/// Validator for mutations that have nothing to check up front.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCheapChecks;

impl<Req: 'static> CheapValidator<Req> for NoCheapChecks {
    fn validate_cheap(&self, _request: &Req) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mockall::mock! {
    pub MutationUseCase<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> {}

    #[async_trait]
    impl<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> MutationUseCase<Req, Resp>
        for MutationUseCase<Req, Resp>
    {
        async fn execute(&self, request: Req) -> Result<Resp, Error>;
    }
}

#[cfg(test)]
mockall::mock! {
    pub QueryUseCase<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> {}

    #[async_trait]
    impl<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> QueryUseCase<Req, Resp>
        for QueryUseCase<Req, Resp>
    {
        async fn execute(&self, request: Req) -> Result<Resp, Error>;
    }
}

#[cfg(test)]
mockall::mock! {
    pub CheapValidator<Req: Send + Sync + 'static> {}

    impl<Req: Send + Sync + 'static> CheapValidator<Req> for CheapValidator<Req> {
        fn validate_cheap(&self, request: &Req) -> Result<(), Error>;
    }
}
