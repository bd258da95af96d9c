//! Delegation orchestration: validator snapshot caching, previews, yield
//! estimates, and bonding manager calls with position hints.

pub mod calls;
mod types;

pub use calls::ContractCall;
pub use types::{BondRequest, PreparedCall, RebondRequest, UnbondRequest};

use std::sync::Arc;

use stakeline_common::units::StakeUnits;
use stakeline_common::{Hint, Validator, EMPTY_ADDRESS};
use tracing::{debug, info};

use crate::cache::Cache;
use crate::hints::{get_hint, simulate_new_active_set_order, ActiveSetChange};
use crate::rewards::{YieldCalculation, YieldCalculator, YieldError, YieldRequest};
use crate::traits::{CallSubmitter, PriceFeed, ValidatorSource};
use crate::{Result, StakingError};

const ACTIVE_VALIDATORS_KEY: &str = "validators:active";

pub struct DelegationService {
    source: Arc<dyn ValidatorSource>,
    cache: Arc<dyn Cache<Vec<Validator>>>,
    yields: YieldCalculator,
    submitter: Option<Arc<dyn CallSubmitter>>,
    bonding_manager: String,
}

impl DelegationService {
    pub fn new(
        source: Arc<dyn ValidatorSource>,
        price_feed: Arc<dyn PriceFeed>,
        cache: Arc<dyn Cache<Vec<Validator>>>,
        bonding_manager: impl Into<String>,
    ) -> Self {
        Self {
            source,
            cache,
            yields: YieldCalculator::new(price_feed),
            submitter: None,
            bonding_manager: bonding_manager.into(),
        }
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn CallSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// Active validators sorted descending by stake, cached for the cache TTL.
    pub async fn validators(&self) -> Result<Vec<Validator>> {
        if let Some(validators) = self.cache.get(ACTIVE_VALIDATORS_KEY) {
            return Ok(validators);
        }

        let mut validators = self.source.active_validators().await?;
        validators.sort_by_key(|v| std::cmp::Reverse(v.stake_units()));
        debug!(count = validators.len(), "Fetched active validators");

        self.cache.set(ACTIVE_VALIDATORS_KEY, validators.clone());
        Ok(validators)
    }

    pub fn invalidate_validators(&self) {
        self.cache.invalidate(ACTIVE_VALIDATORS_KEY);
    }

    pub async fn hint(&self, target: &str) -> Result<Hint> {
        let validators = self.validators().await?;
        Ok(get_hint(target, &validators))
    }

    pub async fn simulate(&self, change: &ActiveSetChange) -> Result<Vec<Validator>> {
        let validators = self.validators().await?;
        Ok(simulate_new_active_set_order(&validators, change))
    }

    pub async fn calculate_yield(
        &self,
        request: &YieldRequest,
    ) -> std::result::Result<YieldCalculation, YieldError> {
        self.yields.calculate(request).await
    }

    pub async fn prepare_bond(&self, request: &BondRequest) -> Result<ContractCall> {
        validate_amount(request.amount)?;
        validate_address("to", &request.to)?;

        let old_delegate = request
            .current_delegate
            .as_deref()
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case(EMPTY_ADDRESS))
            .filter(|d| !d.eq_ignore_ascii_case(&request.to));

        let mut change = ActiveSetChange::delegate(&request.to, request.amount);
        if let Some(old) = old_delegate {
            change = change.from_source(old);
        }

        let simulated = self.simulate(&change).await?;
        let old_hint = old_delegate
            .map(|old| get_hint(old, &simulated))
            .unwrap_or_default();
        let new_hint = get_hint(&request.to, &simulated);

        Ok(calls::bond_with_hint(
            &self.bonding_manager,
            request.amount,
            &request.to,
            &old_hint,
            &new_hint,
        ))
    }

    pub async fn prepare_unbond(&self, request: &UnbondRequest) -> Result<ContractCall> {
        validate_amount(request.amount)?;
        validate_address("delegate", &request.delegate)?;

        let simulated = self
            .simulate(&ActiveSetChange::undelegate(&request.delegate, request.amount))
            .await?;
        let hint = get_hint(&request.delegate, &simulated);

        Ok(calls::unbond_with_hint(&self.bonding_manager, request.amount, &hint))
    }

    pub async fn prepare_rebond(&self, request: &RebondRequest) -> Result<ContractCall> {
        validate_amount(request.amount)?;
        validate_address("delegate", &request.delegate)?;

        let simulated = self
            .simulate(&ActiveSetChange::delegate(&request.delegate, request.amount))
            .await?;
        let hint = get_hint(&request.delegate, &simulated);

        Ok(if request.from_unbonded {
            calls::rebond_from_unbonded_with_hint(
                &self.bonding_manager,
                &request.delegate,
                request.unbonding_lock_id,
                &hint,
            )
        } else {
            calls::rebond_with_hint(&self.bonding_manager, request.unbonding_lock_id, &hint)
        })
    }

    /// Hands `call` to the wallet service for signing and broadcast.
    pub async fn submit(&self, wallet_id: &str, call: &ContractCall) -> Result<String> {
        let submitter = self.submitter.as_ref().ok_or_else(|| {
            StakingError::Configuration("wallet service is not configured".into())
        })?;

        let tx_hash = submitter.submit(wallet_id, call).await?;
        info!(wallet_id, function = %call.function, %tx_hash, "Submitted bonding manager call");

        // the submitted change will reorder the set once mined
        self.invalidate_validators();
        Ok(tx_hash)
    }

    /// Submits when a wallet is given, otherwise returns the call unsent.
    pub async fn finish(&self, call: ContractCall, wallet_id: Option<&str>) -> Result<PreparedCall> {
        let transaction_hash = match wallet_id {
            Some(wallet_id) => Some(self.submit(wallet_id, &call).await?),
            None => None,
        };
        Ok(PreparedCall {
            call,
            transaction_hash,
        })
    }
}

fn validate_amount(amount: StakeUnits) -> Result<()> {
    if amount == 0 {
        return Err(StakingError::InvalidStakeAmount("amount must be greater than zero".into()));
    }
    Ok(())
}

fn validate_address(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() || value.eq_ignore_ascii_case(EMPTY_ADDRESS) {
        return Err(StakingError::Validation(format!("{} must be a validator address", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryCache};
    use crate::traits::{MockCallSubmitter, MockPriceFeed, MockValidatorSource};
    use stakeline_common::units::UNITS_PER_TOKEN;
    use std::time::Duration;

    fn snapshot() -> Vec<Validator> {
        // deliberately unsorted
        vec![
            Validator::new("0xb", "200").unwrap(),
            Validator::new("0xa", "300").unwrap(),
            Validator::new("0xc", "100").unwrap(),
            Validator::new("0xd", "50").unwrap(),
        ]
    }

    fn source(times: usize) -> MockValidatorSource {
        let mut source = MockValidatorSource::new();
        source
            .expect_active_validators()
            .times(times)
            .returning(|| Ok(snapshot()));
        source
    }

    fn service_with(source: MockValidatorSource) -> (DelegationService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(MemoryCache::<Vec<Validator>>::with_clock(Duration::from_secs(30), clock.clone()));
        let service = DelegationService::new(Arc::new(source), Arc::new(MockPriceFeed::new()), cache, "0xbonding");
        (service, clock)
    }

    #[tokio::test]
    async fn test_validators_sorted_and_cached() {
        let (service, clock) = service_with(source(2));

        let first = service.validators().await.unwrap();
        let ids: Vec<&str> = first.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["0xa", "0xb", "0xc", "0xd"]);

        service.validators().await.unwrap();
        clock.advance(Duration::from_secs(31));
        service.validators().await.unwrap();
    }

    #[tokio::test]
    async fn test_hint_uses_sorted_snapshot() {
        let (service, _) = service_with(source(1));
        let hint = service.hint("0xB").await.unwrap();
        assert_eq!(hint, Hint::new("0xa", "0xc"));
    }

    #[tokio::test]
    async fn test_prepare_bond_moving_stake() {
        let (service, _) = service_with(source(1));
        let request = BondRequest {
            amount: 250 * UNITS_PER_TOKEN,
            to: "0xd".into(),
            current_delegate: Some("0xA".into()),
            wallet_id: None,
        };

        let call = service.prepare_bond(&request).await.unwrap();
        assert_eq!(call.function, "bondWithHint");
        assert_eq!(call.to, "0xbonding");
        // simulated order: 0xd(300), 0xb(200), 0xc(100), 0xa(50)
        assert_eq!(
            call.args,
            vec![
                (250 * UNITS_PER_TOKEN).to_string(),
                "0xd".to_string(),
                "0xc".to_string(),
                EMPTY_ADDRESS.to_string(),
                EMPTY_ADDRESS.to_string(),
                "0xb".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_prepare_bond_fresh_delegator() {
        let (service, _) = service_with(source(1));
        let request = BondRequest {
            amount: UNITS_PER_TOKEN,
            to: "0xc".into(),
            current_delegate: Some(EMPTY_ADDRESS.into()),
            wallet_id: None,
        };

        let call = service.prepare_bond(&request).await.unwrap();
        assert_eq!(call.args[2], EMPTY_ADDRESS);
        assert_eq!(call.args[3], EMPTY_ADDRESS);
        assert_eq!(call.args[4], "0xb");
        assert_eq!(call.args[5], "0xd");
    }

    #[tokio::test]
    async fn test_prepare_unbond() {
        let (service, _) = service_with(source(1));
        let request = UnbondRequest {
            amount: 1000 * UNITS_PER_TOKEN,
            delegate: "0xa".into(),
            wallet_id: None,
        };

        let call = service.prepare_unbond(&request).await.unwrap();
        // 0xa floors to zero and drops to the bottom
        assert_eq!(call.args[1], "0xd");
        assert_eq!(call.args[2], EMPTY_ADDRESS);
    }

    #[tokio::test]
    async fn test_prepare_rebond_variants() {
        let (service, _) = service_with(source(1));
        let mut request = RebondRequest {
            unbonding_lock_id: 7,
            amount: 120 * UNITS_PER_TOKEN,
            delegate: "0xc".into(),
            from_unbonded: false,
            wallet_id: None,
        };

        let call = service.prepare_rebond(&request).await.unwrap();
        assert_eq!(call.function, "rebondWithHint");
        // 0xc: 220 sits between 0xa and 0xb
        assert_eq!(call.args, vec!["7", "0xa", "0xb"]);

        request.from_unbonded = true;
        let call = service.prepare_rebond(&request).await.unwrap();
        assert_eq!(call.function, "rebondFromUnbondedWithHint");
        assert_eq!(call.args, vec!["0xc", "7", "0xa", "0xb"]);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let (service, _) = service_with(MockValidatorSource::new());
        let request = UnbondRequest {
            amount: 0,
            delegate: "0xa".into(),
            wallet_id: None,
        };
        assert!(matches!(
            service.prepare_unbond(&request).await,
            Err(StakingError::InvalidStakeAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_hands_off_and_invalidates() {
        let mut submitter = MockCallSubmitter::new();
        submitter
            .expect_submit()
            .withf(|wallet, call| wallet == "wallet-1" && call.function == "unbondWithHint")
            .times(1)
            .returning(|_, _| Ok("0xhash".to_string()));

        let (service, _) = service_with(source(2));
        let service = service.with_submitter(Arc::new(submitter));

        let call = service
            .prepare_unbond(&UnbondRequest {
                amount: UNITS_PER_TOKEN,
                delegate: "0xb".into(),
                wallet_id: None,
            })
            .await
            .unwrap();

        let prepared = service.finish(call, Some("wallet-1")).await.unwrap();
        assert_eq!(prepared.transaction_hash.as_deref(), Some("0xhash"));

        // cache was dropped, so this refetches
        service.validators().await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_without_wallet_service() {
        let (service, _) = service_with(MockValidatorSource::new());
        let call = calls::unbond_with_hint("0xbonding", 1, &Hint::empty());

        let prepared = service.finish(call.clone(), None).await.unwrap();
        assert!(prepared.transaction_hash.is_none());
        assert!(matches!(
            service.submit("wallet-1", &call).await,
            Err(StakingError::Configuration(_))
        ));
    }
}
