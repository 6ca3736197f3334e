//! The authoritative ledger.

use rusqlite::Connection;

use muse_db::queries::{escrow, events, projects, settings};
use muse_db::DbError;
use muse_split::{split, ShareTable};
use muse_types::events::{DistributionEvent, WithdrawalEvent};
use muse_types::payment::PaymentReceipt;
use muse_types::project::Project;
use muse_types::{unix_now, AccountId, Amount, ProjectId};

use crate::treasury::Treasury;
use crate::{LedgerError, Result};

/// The outcome of one revenue distribution.
#[derive(Clone, Debug)]
pub struct Distribution {
    /// The recorded feed event.
    pub event: DistributionEvent,
    /// Per-contributor credits in share-table order.
    pub credits: Vec<(AccountId, Amount)>,
    /// Remainder left undistributed by floor division.
    pub rounding_loss: Amount,
}

/// The outcome of one contributor withdrawal.
#[derive(Clone, Debug)]
pub struct Withdrawal {
    /// The recorded feed event.
    pub event: WithdrawalEvent,
    /// Receipt from the treasury backend.
    pub receipt: PaymentReceipt,
}

/// Registry, distributor, and escrow over one SQLite database.
///
/// Registry mutations are restricted to the owner account fixed at
/// construction. Distribution is open to any caller; withdrawal only
/// ever touches the caller's own balance.
pub struct Ledger {
    conn: Connection,
    owner: AccountId,
}

impl Ledger {
    /// Wrap an opened database connection.
    pub fn new(conn: Connection, owner: AccountId) -> Self {
        Self { conn, owner }
    }

    /// The registry owner account.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn authorize(&self, caller: &str) -> Result<()> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------

    /// Register a new project with its contributor share listing.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::InvalidShares`] if the listing fails validation
    /// - [`LedgerError::DuplicateProject`] if the id is taken
    pub fn register_project(
        &mut self,
        caller: &str,
        project_id: &str,
        name: &str,
        contributors: Vec<AccountId>,
        shares: Vec<u8>,
    ) -> Result<Project> {
        self.authorize(caller)?;
        let table = ShareTable::new(contributors, shares)?;

        let tx = self.conn.transaction().map_err(DbError::Sqlite)?;
        if projects::exists(&tx, project_id)? {
            return Err(LedgerError::DuplicateProject(project_id.to_string()));
        }
        projects::insert(&tx, project_id, name, unix_now())?;
        projects::replace_contributors(&tx, project_id, table.entries())?;
        let project = projects::get(&tx, project_id)?;
        tx.commit().map_err(DbError::Sqlite)?;

        tracing::info!(
            project_id,
            contributors = table.len(),
            "project registered"
        );
        Ok(project)
    }

    /// Replace a project's contributor listing. The swap is atomic: a
    /// failed validation or write leaves the previous listing in place.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::ProjectNotFound`] if the id is unknown
    /// - [`LedgerError::InvalidShares`] if the listing fails validation
    pub fn update_project(
        &mut self,
        caller: &str,
        project_id: &str,
        contributors: Vec<AccountId>,
        shares: Vec<u8>,
    ) -> Result<Project> {
        self.authorize(caller)?;
        let table = ShareTable::new(contributors, shares)?;

        let tx = self.conn.transaction().map_err(DbError::Sqlite)?;
        if !projects::exists(&tx, project_id)? {
            return Err(LedgerError::ProjectNotFound(project_id.to_string()));
        }
        projects::replace_contributors(&tx, project_id, table.entries())?;
        let project = projects::get(&tx, project_id)?;
        tx.commit().map_err(DbError::Sqlite)?;

        tracing::info!(project_id, contributors = table.len(), "project updated");
        Ok(project)
    }

    /// Deactivate a project. One-way; repeating is a no-op.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::ProjectNotFound`] if the id is unknown
    pub fn deactivate_project(&mut self, caller: &str, project_id: &str) -> Result<()> {
        self.authorize(caller)?;

        match projects::deactivate(&self.conn, project_id) {
            Ok(()) => {
                tracing::info!(project_id, "project deactivated");
                Ok(())
            }
            Err(DbError::NotFound(_)) => {
                Err(LedgerError::ProjectNotFound(project_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load a full project record.
    pub fn get_project(&self, project_id: &str) -> Result<Project> {
        match projects::get(&self.conn, project_id) {
            Ok(p) => Ok(p),
            Err(DbError::NotFound(_)) => {
                Err(LedgerError::ProjectNotFound(project_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All registered project ids, oldest first.
    pub fn project_ids(&self) -> Result<Vec<ProjectId>> {
        Ok(projects::all_ids(&self.conn)?)
    }

    /// Whether a project accepts distributions.
    pub fn is_project_active(&self, project_id: &str) -> Result<bool> {
        match projects::is_active(&self.conn, project_id) {
            Ok(active) => Ok(active),
            Err(DbError::NotFound(_)) => {
                Err(LedgerError::ProjectNotFound(project_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lifetime total distributed to a project.
    pub fn total_distributed(&self, project_id: &str) -> Result<Amount> {
        Ok(self.get_project(project_id)?.total_distributed)
    }

    // ---------------------------------------------------------------
    // Distribution
    // ---------------------------------------------------------------

    /// Split an inbound payment across a project's contributors.
    ///
    /// Each contributor is credited `amount * share / 100` (floor); the
    /// remainder stays undistributed and is reported as rounding loss.
    /// The project's lifetime total grows by the full `amount`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ProjectNotFound`] if the id is unknown
    /// - [`LedgerError::ProjectInactive`] if the project was deactivated
    /// - [`LedgerError::ZeroAmount`] if `amount` is zero
    /// - [`LedgerError::Overflow`] on arithmetic overflow
    pub fn distribute_revenue(&mut self, project_id: &str, amount: Amount) -> Result<Distribution> {
        let tx = self.conn.transaction().map_err(DbError::Sqlite)?;

        let project = match projects::get(&tx, project_id) {
            Ok(p) => p,
            Err(DbError::NotFound(_)) => {
                return Err(LedgerError::ProjectNotFound(project_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        if !project.is_active {
            return Err(LedgerError::ProjectInactive(project_id.to_string()));
        }

        // Stored listings were validated at registration time.
        let table = ShareTable::new(project.contributors, project.shares)?;
        let outcome = split(amount, &table)?;

        for (account, cut) in &outcome.credits {
            if *cut > 0 {
                escrow::credit(&tx, account, *cut)?;
            }
        }
        projects::add_distributed(&tx, project_id, amount)?;

        let timestamp = unix_now();
        let seq = events::record_distribution(&tx, project_id, amount, outcome.credited, timestamp)?;
        tx.commit().map_err(DbError::Sqlite)?;

        tracing::info!(
            project_id,
            amount,
            credited = outcome.credited,
            rounding_loss = outcome.rounding_loss,
            "revenue distributed"
        );

        Ok(Distribution {
            event: DistributionEvent {
                seq,
                project_id: project_id.to_string(),
                amount,
                credited: outcome.credited,
                timestamp,
            },
            credits: outcome.credits,
            rounding_loss: outcome.rounding_loss,
        })
    }

    /// Accumulated un-withdrawn balance. Zero if never credited.
    pub fn contributor_balance(&self, account: &str) -> Result<Amount> {
        Ok(escrow::balance(&self.conn, account)?)
    }

    /// A contributor's percentage in a project, zero if not a contributor.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ProjectNotFound`] if the id is unknown
    pub fn contributor_share(&self, project_id: &str, account: &str) -> Result<u8> {
        Ok(self.get_project(project_id)?.share_of(account))
    }

    /// Sum of every contributor's escrow balance.
    pub fn total_escrow_held(&self) -> Result<Amount> {
        Ok(escrow::total_held(&self.conn)?)
    }

    // ---------------------------------------------------------------
    // Withdrawal
    // ---------------------------------------------------------------

    /// Pay out the caller's full escrow balance through `treasury`.
    ///
    /// The balance is zeroed before the treasury transfer runs; a failed
    /// transfer rolls the zeroing back with the rest of the transaction,
    /// so no state changes unless the payout succeeded.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NothingToWithdraw`] if the balance is zero
    /// - [`LedgerError::Transfer`] if the treasury rejects the payout
    pub fn withdraw(&mut self, caller: &str, treasury: &dyn Treasury) -> Result<Withdrawal> {
        let tx = self.conn.transaction().map_err(DbError::Sqlite)?;

        let held = escrow::clear(&tx, caller)?;
        if held == 0 {
            return Err(LedgerError::NothingToWithdraw(caller.to_string()));
        }

        let receipt = treasury
            .transfer(&caller.to_string(), held)
            .map_err(|e| LedgerError::Transfer(e.to_string()))?;

        let timestamp = unix_now();
        let seq = events::record_withdrawal(&tx, caller, held, &receipt.hash, timestamp)?;
        tx.commit().map_err(DbError::Sqlite)?;

        tracing::info!(account = caller, amount = held, "balance withdrawn");

        Ok(Withdrawal {
            event: WithdrawalEvent {
                seq,
                account: caller.to_string(),
                amount: held,
                receipt_hash: receipt.hash.clone(),
                timestamp,
            },
            receipt,
        })
    }

    // ---------------------------------------------------------------
    // Feeds & settings
    // ---------------------------------------------------------------

    /// Most recent distribution events, newest first.
    pub fn recent_distributions(&self, limit: u32) -> Result<Vec<DistributionEvent>> {
        Ok(events::recent_distributions(&self.conn, limit)?)
    }

    /// Most recent withdrawal events, newest first.
    pub fn recent_withdrawals(&self, limit: u32) -> Result<Vec<WithdrawalEvent>> {
        Ok(events::recent_withdrawals(&self.conn, limit)?)
    }

    /// Read a persisted daemon setting.
    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        Ok(settings::get(&self.conn, key)?)
    }

    /// Persist a daemon setting.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        Ok(settings::set(&self.conn, key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use muse_types::payment::PaymentStatus;
    use crate::treasury::TreasuryError;

    const OWNER: &str = "owner";

    /// Treasury that records transfers and always succeeds.
    struct RecordingTreasury {
        transfers: RefCell<Vec<(AccountId, Amount)>>,
    }

    impl RecordingTreasury {
        fn new() -> Self {
            Self {
                transfers: RefCell::new(Vec::new()),
            }
        }
    }

    impl Treasury for RecordingTreasury {
        fn transfer(
            &self,
            to: &AccountId,
            amount: Amount,
        ) -> std::result::Result<PaymentReceipt, TreasuryError> {
            self.transfers.borrow_mut().push((to.clone(), amount));
            Ok(PaymentReceipt {
                hash: format!("0xtest{:04}", self.transfers.borrow().len()),
                to: to.clone(),
                amount,
                status: PaymentStatus::Confirmed,
                network: "test".to_string(),
                timestamp: unix_now(),
            })
        }
    }

    /// Treasury that always fails.
    struct FailingTreasury;

    impl Treasury for FailingTreasury {
        fn transfer(
            &self,
            _to: &AccountId,
            _amount: Amount,
        ) -> std::result::Result<PaymentReceipt, TreasuryError> {
            Err(TreasuryError("rail unavailable".to_string()))
        }
    }

    fn test_ledger() -> Ledger {
        let conn = muse_db::open_memory().expect("open test db");
        Ledger::new(conn, OWNER.to_string())
    }

    fn accounts(names: &[&str]) -> Vec<AccountId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_register_and_get() {
        let mut ledger = test_ledger();
        let project = ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice", "bob"]), vec![70, 30])
            .expect("register");

        assert_eq!(project.project_id, "p1");
        assert!(project.is_active);
        assert_eq!(project.total_distributed, 0);
        assert_eq!(ledger.project_ids().expect("ids"), vec!["p1"]);
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice"]), vec![100])
            .expect("register");

        let result =
            ledger.register_project(OWNER, "p1", "Again", accounts(&["bob"]), vec![100]);
        assert!(matches!(result, Err(LedgerError::DuplicateProject(_))));
    }

    #[test]
    fn test_register_invalid_shares_rejected() {
        let mut ledger = test_ledger();
        let result = ledger.register_project(
            OWNER,
            "p1",
            "Bad",
            accounts(&["alice", "bob"]),
            vec![60, 30],
        );
        assert!(matches!(result, Err(LedgerError::InvalidShares(_))));
        // Nothing was written.
        assert!(ledger.project_ids().expect("ids").is_empty());
    }

    #[test]
    fn test_register_requires_owner() {
        let mut ledger = test_ledger();
        let result =
            ledger.register_project("mallory", "p1", "First", accounts(&["alice"]), vec![100]);
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
    }

    #[test]
    fn test_distribute_70_30() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice", "bob"]), vec![70, 30])
            .expect("register");

        let distribution = ledger.distribute_revenue("p1", 100).expect("distribute");
        assert_eq!(distribution.event.credited, 100);
        assert_eq!(distribution.rounding_loss, 0);

        assert_eq!(ledger.contributor_balance("alice").expect("balance"), 70);
        assert_eq!(ledger.contributor_balance("bob").expect("balance"), 30);
        assert_eq!(ledger.total_distributed("p1").expect("total"), 100);
    }

    #[test]
    fn test_distribute_unknown_project() {
        let mut ledger = test_ledger();
        let result = ledger.distribute_revenue("ghost", 100);
        assert!(matches!(result, Err(LedgerError::ProjectNotFound(_))));
    }

    #[test]
    fn test_distribute_inactive_rejected() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice"]), vec![100])
            .expect("register");
        ledger.distribute_revenue("p1", 500).expect("distribute");
        ledger.deactivate_project(OWNER, "p1").expect("deactivate");

        let result = ledger.distribute_revenue("p1", 100);
        assert!(matches!(result, Err(LedgerError::ProjectInactive(_))));
        // Prior accounting is untouched.
        assert_eq!(ledger.total_distributed("p1").expect("total"), 500);
        assert_eq!(ledger.contributor_balance("alice").expect("balance"), 500);
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice"]), vec![100])
            .expect("register");
        ledger.deactivate_project(OWNER, "p1").expect("first");
        ledger.deactivate_project(OWNER, "p1").expect("second is a no-op");
        assert!(!ledger.is_project_active("p1").expect("active"));
    }

    #[test]
    fn test_update_changes_future_splits_only() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice", "bob"]), vec![70, 30])
            .expect("register");
        ledger.distribute_revenue("p1", 100).expect("distribute");

        ledger
            .update_project(OWNER, "p1", accounts(&["alice", "bob"]), vec![50, 50])
            .expect("update");
        ledger.distribute_revenue("p1", 100).expect("distribute");

        // 70 + 50 and 30 + 50: earlier credits are not retroactively adjusted.
        assert_eq!(ledger.contributor_balance("alice").expect("balance"), 120);
        assert_eq!(ledger.contributor_balance("bob").expect("balance"), 80);
    }

    #[test]
    fn test_update_invalid_shares_keeps_old_listing() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice", "bob"]), vec![70, 30])
            .expect("register");

        let result =
            ledger.update_project(OWNER, "p1", accounts(&["alice", "bob"]), vec![60, 30]);
        assert!(matches!(result, Err(LedgerError::InvalidShares(_))));

        let project = ledger.get_project("p1").expect("get");
        assert_eq!(project.shares, vec![70, 30]);
    }

    #[test]
    fn test_contributor_share() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice", "bob"]), vec![80, 20])
            .expect("register");

        assert_eq!(ledger.contributor_share("p1", "alice").expect("share"), 80);
        assert_eq!(ledger.contributor_share("p1", "carol").expect("share"), 0);
        assert!(matches!(
            ledger.contributor_share("ghost", "alice"),
            Err(LedgerError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_withdraw_full_flow() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice", "bob"]), vec![70, 30])
            .expect("register");
        ledger.distribute_revenue("p1", 100).expect("distribute");

        let treasury = RecordingTreasury::new();
        let withdrawal = ledger.withdraw("alice", &treasury).expect("withdraw");

        assert_eq!(withdrawal.event.amount, 70);
        assert_eq!(withdrawal.receipt.amount, 70);
        assert_eq!(
            treasury.transfers.borrow().as_slice(),
            &[("alice".to_string(), 70)]
        );
        assert_eq!(ledger.contributor_balance("alice").expect("balance"), 0);

        // Second withdrawal finds nothing.
        let result = ledger.withdraw("alice", &treasury);
        assert!(matches!(result, Err(LedgerError::NothingToWithdraw(_))));
        // Bob's balance is untouched.
        assert_eq!(ledger.contributor_balance("bob").expect("balance"), 30);
    }

    #[test]
    fn test_withdraw_failed_transfer_restores_balance() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice"]), vec![100])
            .expect("register");
        ledger.distribute_revenue("p1", 1_000).expect("distribute");

        let result = ledger.withdraw("alice", &FailingTreasury);
        assert!(matches!(result, Err(LedgerError::Transfer(_))));

        // The rolled-back transaction restored the balance.
        assert_eq!(ledger.contributor_balance("alice").expect("balance"), 1_000);
        assert!(ledger.recent_withdrawals(10).expect("feed").is_empty());
    }

    #[test]
    fn test_distribution_feed() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice"]), vec![100])
            .expect("register");
        ledger.distribute_revenue("p1", 100).expect("distribute");
        ledger.distribute_revenue("p1", 200).expect("distribute");

        let feed = ledger.recent_distributions(10).expect("feed");
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].amount, 200);
        assert!(feed[0].seq > feed[1].seq);
    }

    #[test]
    fn test_rounding_loss_stays_unallocated() {
        let mut ledger = test_ledger();
        ledger
            .register_project(
                OWNER,
                "p1",
                "First",
                accounts(&["a", "b", "c"]),
                vec![33, 33, 34],
            )
            .expect("register");

        let distribution = ledger.distribute_revenue("p1", 10).expect("distribute");
        assert_eq!(distribution.event.credited, 9);
        assert_eq!(distribution.rounding_loss, 1);
        assert_eq!(ledger.total_escrow_held().expect("held"), 9);
        // Lifetime total still counts the full inbound amount.
        assert_eq!(ledger.total_distributed("p1").expect("total"), 10);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut ledger = test_ledger();
        ledger
            .register_project(OWNER, "p1", "First", accounts(&["alice"]), vec![100])
            .expect("register");
        assert!(matches!(
            ledger.distribute_revenue("p1", 0),
            Err(LedgerError::ZeroAmount)
        ));
    }
}
