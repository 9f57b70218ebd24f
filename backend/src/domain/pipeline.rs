//! Mutation pipeline: cheap validation, then the inner use case inside a
//! unit of work.
//!
//! ```text
//! request ─► CheapValidator ─► UnitOfWork::execute ─► inner use case ─► flush ─► commit
//!                 │ fails                                     │ fails
//!                 └─► InvalidRequest, no transaction          └─► rollback, error unchanged
//! ```

use async_trait::async_trait;

use super::Error;
use super::UnitOfWork;
use super::ports::{CheapValidator, MutationUseCase, TransactionManager};

/// Decorates a mutation use case with validation and a transaction.
pub struct MutationPipeline<V, M, U> {
    validator: V,
    unit_of_work: UnitOfWork<M>,
    inner: U,
}

impl<V, M, U> MutationPipeline<V, M, U> {
    pub fn new(validator: V, unit_of_work: UnitOfWork<M>, inner: U) -> Self {
        Self {
            validator,
            unit_of_work,
            inner,
        }
    }
}

#[async_trait]
impl<V, M, U, Req, Resp> MutationUseCase<Req, Resp> for MutationPipeline<V, M, U>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    V: CheapValidator<Req>,
    M: TransactionManager,
    U: MutationUseCase<Req, Resp>,
{
    async fn execute(&self, request: Req) -> Result<Resp, Error> {
        self.validator.validate_cheap(&request)?;
        self.unit_of_work
            .execute(move || self.inner.execute(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockCheapValidator, MockMutationUseCase};
    use crate::domain::{ErrorCode, UnitOfWork};
    use crate::outbound::memory::InMemoryStore;

    fn pipeline(
        validator: MockCheapValidator<String>,
        inner: MockMutationUseCase<String, usize>,
    ) -> MutationPipeline<MockCheapValidator<String>, InMemoryStore, MockMutationUseCase<String, usize>>
    {
        MutationPipeline::new(
            validator,
            UnitOfWork::new(Arc::new(InMemoryStore::new())),
            inner,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_requests_never_reach_the_inner_use_case() {
        let mut validator = MockCheapValidator::new();
        validator
            .expect_validate_cheap()
            .times(1)
            .returning(|_| Err(Error::invalid_request("blank")));
        let mut inner = MockMutationUseCase::new();
        inner.expect_execute().never();

        let result = pipeline(validator, inner).execute(" ".to_owned()).await;

        assert_eq!(result.map_err(|e| e.code()), Err(ErrorCode::InvalidRequest));
    }

    #[rstest]
    #[tokio::test]
    async fn valid_requests_return_the_inner_result() {
        let mut validator = MockCheapValidator::new();
        validator.expect_validate_cheap().times(1).returning(|_| Ok(()));
        let mut inner = MockMutationUseCase::new();
        inner
            .expect_execute()
            .with(eq("squat".to_owned()))
            .times(1)
            .returning(|request: String| Ok(request.len()));

        let result = pipeline(validator, inner).execute("squat".to_owned()).await;

        assert_eq!(result, Ok(5));
    }

    #[rstest]
    #[tokio::test]
    async fn inner_errors_propagate_unchanged() {
        let mut validator = MockCheapValidator::new();
        validator.expect_validate_cheap().returning(|_| Ok(()));
        let mut inner = MockMutationUseCase::new();
        inner
            .expect_execute()
            .returning(|_| Err(Error::not_found("plan 9 does not exist")));

        let result = pipeline(validator, inner).execute("x".to_owned()).await;

        assert_eq!(result, Err(Error::not_found("plan 9 does not exist")));
    }
}
