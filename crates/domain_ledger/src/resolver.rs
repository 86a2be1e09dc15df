//! Account resolution
//!
//! Turns [`AccountRef`]s into persisted account identifiers. Identifiers pass
//! through untouched; codes are looked up in the chart of accounts.

use futures::future::try_join_all;
use tracing::debug;

use core_kernel::{AccountId, PortError};

use crate::account::AccountRef;
use crate::ports::LedgerPort;

/// Resolves account references through a [`LedgerPort`]
pub struct AccountResolver<'a> {
    port: &'a dyn LedgerPort,
}

impl<'a> AccountResolver<'a> {
    pub fn new(port: &'a dyn LedgerPort) -> Self {
        Self { port }
    }

    /// Resolves one reference
    ///
    /// Returns `Ok(None)` when no active account carries the code. Port
    /// failures are returned as errors, never as "not found".
    pub async fn resolve(&self, account: &AccountRef) -> Result<Option<AccountId>, PortError> {
        match account {
            AccountRef::ById(id) => Ok(Some(*id)),
            AccountRef::ByCode(code) => {
                let found = self
                    .port
                    .find_account_by_code(code)
                    .await?
                    .filter(|a| a.is_active)
                    .map(|a| a.id);
                debug!(code = %code, resolved = found.is_some(), "Resolved account code");
                Ok(found)
            }
        }
    }

    /// Resolves all references concurrently, preserving order
    pub async fn resolve_all(
        &self,
        accounts: &[AccountRef],
    ) -> Result<Vec<Option<AccountId>>, PortError> {
        try_join_all(accounts.iter().map(|account| self.resolve(account))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountType};
    use crate::ports::mock::MockLedgerPort;

    #[tokio::test]
    async fn test_id_passes_through_without_lookup() {
        let port = MockLedgerPort::new();
        let id = AccountId::new();
        let resolved = AccountResolver::new(&port).resolve(&AccountRef::id(id)).await.unwrap();
        assert_eq!(resolved, Some(id));
    }

    #[tokio::test]
    async fn test_code_lookup() {
        let port = MockLedgerPort::with_standard_chart();
        let ar = port.account_by_code("1210").await.unwrap();
        let resolved = AccountResolver::new(&port)
            .resolve(&AccountRef::code("1210"))
            .await
            .unwrap();
        assert_eq!(resolved, Some(ar.id));
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_codes_do_not_resolve() {
        let port = MockLedgerPort::new();
        let closed = Account::new(AccountId::new(), "1999", "Closed bank", AccountType::Asset);
        port.add_account(closed.deactivated()).await;
        let resolver = AccountResolver::new(&port);

        assert_eq!(resolver.resolve(&AccountRef::code("1999")).await.unwrap(), None);
        assert_eq!(resolver.resolve(&AccountRef::code("0000")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_all_preserves_order() {
        let port = MockLedgerPort::with_standard_chart();
        let revenue = port.account_by_code("4110").await.unwrap();
        let explicit = AccountId::new();

        let resolved = AccountResolver::new(&port)
            .resolve_all(&[
                AccountRef::id(explicit),
                AccountRef::code("missing"),
                AccountRef::code("4110"),
            ])
            .await
            .unwrap();

        assert_eq!(resolved, vec![Some(explicit), None, Some(revenue.id)]);
    }
}
