#![allow(async_fn_in_trait)]

use intercom_core::Verdict;
use intercom_storage::StoredValidator;

use crate::error::Result;

/// Credential check used by the kiosk session.
///
/// Implemented by [`StoredValidator`] for real kiosks; tests supply their own.
pub trait AccessCheck: Send + Sync {
    async fn check(&self, unit_number: &str, passcode: &str) -> Result<Verdict>;
}

impl AccessCheck for StoredValidator {
    async fn check(&self, unit_number: &str, passcode: &str) -> Result<Verdict> {
        Ok(StoredValidator::check(self, unit_number, passcode).await?)
    }
}

impl<T: AccessCheck> AccessCheck for &T {
    async fn check(&self, unit_number: &str, passcode: &str) -> Result<Verdict> {
        (**self).check(unit_number, passcode).await
    }
}
