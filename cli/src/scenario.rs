//! Scenario files and their replay against a real token ledger.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{bail, Context};
use quorum_governance::{ActionRouter, GovernanceConfig, GovernanceEngine};
use quorum_ledger::{LedgerCall, TokenLedger};
use quorum_nullables::NullClock;
use quorum_types::{Address, BalanceLedger, Clock, ProposalId, TokenAmount};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

type Engine = GovernanceEngine<Arc<TokenLedger>, ActionRouter, Arc<NullClock>>;

/// A scripted sequence of governance operations.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Address of the token ledger, the default proposal recipient.
    #[serde(default = "default_token")]
    pub token: Address,
    /// Owner of the token, allowed to mint during setup.
    #[serde(default = "default_token_owner")]
    pub token_owner: Address,
    /// Simulated clock reading when the replay starts.
    #[serde(default)]
    pub start_time: u64,
    pub steps: Vec<Step>,
}

fn default_token() -> Address {
    Address::new("token")
}

fn default_token_owner() -> Address {
    Address::new("token-owner")
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Token owner mints to `to`.
    Mint { to: Address, amount: TokenAmount },
    /// `owner` lets the escrow pull `amount`.
    Approve { owner: Address, amount: TokenAmount },
    TopUp { caller: Address, amount: TokenAmount },
    Reduce { caller: Address, amount: TokenAmount },
    Propose {
        caller: Address,
        #[serde(default)]
        recipient: Option<Address>,
        #[serde(default)]
        description: String,
        /// Mint call on the token, encoded for the proposal.
        #[serde(default)]
        mint: Option<MintSpec>,
        /// Raw call data, hex encoded.
        #[serde(default)]
        call_data: Option<String>,
    },
    Vote {
        caller: Address,
        proposal: u64,
        support: bool,
    },
    /// Move the simulated clock forward.
    Advance { secs: u64 },
    Finish { caller: Address, proposal: u64 },
}

#[derive(Debug, Deserialize)]
pub struct MintSpec {
    pub to: Address,
    pub amount: TokenAmount,
}

/// Result of one step, printed as a JSON line.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Mint { .. } => "mint",
            Step::Approve { .. } => "approve",
            Step::TopUp { .. } => "top_up",
            Step::Reduce { .. } => "reduce",
            Step::Propose { .. } => "propose",
            Step::Vote { .. } => "vote",
            Step::Advance { .. } => "advance",
            Step::Finish { .. } => "finish",
        }
    }

    fn participants(&self) -> Vec<&Address> {
        match self {
            Step::Mint { to, .. } => vec![to],
            Step::Approve { owner, .. } => vec![owner],
            Step::TopUp { caller, .. } | Step::Reduce { caller, .. } => vec![caller],
            Step::Vote { caller, .. } | Step::Finish { caller, .. } => vec![caller],
            Step::Propose { mint, .. } => mint.iter().map(|m| &m.to).collect(),
            Step::Advance { .. } => Vec::new(),
        }
    }
}

/// An engine wired to a fresh token ledger, driven step by step.
pub struct Replay {
    engine: Engine,
    token: Arc<TokenLedger>,
    clock: Arc<NullClock>,
    token_address: Address,
    token_owner: Address,
    accounts: BTreeSet<Address>,
}

impl Replay {
    /// Deploy the token, grant the escrow the mint role and register the
    /// token as a dispatch target.
    pub fn new(config: GovernanceConfig, scenario: &Scenario) -> anyhow::Result<Self> {
        let token = Arc::new(TokenLedger::new(
            scenario.token.clone(),
            scenario.token_owner.clone(),
        ));
        token
            .set_minter(&scenario.token_owner, config.escrow.clone())
            .context("granting the escrow the mint role")?;
        let router = ActionRouter::new().with_target(scenario.token.clone(), token.clone());
        let clock = Arc::new(NullClock::new(scenario.start_time));

        let accounts = scenario
            .steps
            .iter()
            .flat_map(Step::participants)
            .cloned()
            .collect();
        let engine = GovernanceEngine::new(config, token.clone(), router, clock.clone())?;

        Ok(Self {
            engine,
            token,
            clock,
            token_address: scenario.token.clone(),
            token_owner: scenario.token_owner.clone(),
            accounts,
        })
    }

    pub fn apply(&mut self, index: usize, step: &Step) -> StepReport {
        let (ok, result, error) = match self.run(step) {
            Ok(result) => (true, result, None),
            Err(e) => {
                tracing::debug!(index, step = step.name(), error = %e, "step failed");
                (false, Value::Null, Some(format!("{e:#}")))
            }
        };
        StepReport {
            index,
            step: step.name(),
            ok,
            result,
            error,
        }
    }

    fn run(&mut self, step: &Step) -> anyhow::Result<Value> {
        Ok(match step {
            Step::Mint { to, amount } => {
                self.token.mint(&self.token_owner, to, *amount)?;
                json!({ "balance": self.token.balance_of(to) })
            }
            Step::Approve { owner, amount } => {
                let escrow = self.engine.config().escrow.clone();
                self.token.approve(owner, &escrow, *amount);
                json!({ "allowance": self.token.allowance(owner, &escrow) })
            }
            Step::TopUp { caller, amount } => {
                json!({ "locked": self.engine.top_up_balance(caller, *amount)? })
            }
            Step::Reduce { caller, amount } => {
                json!({ "locked": self.engine.reduce_balance(caller, *amount)? })
            }
            Step::Propose {
                caller,
                recipient,
                description,
                mint,
                call_data,
            } => {
                let call_data = match (mint, call_data) {
                    (Some(_), Some(_)) => bail!("give either mint or call_data, not both"),
                    (Some(m), None) => LedgerCall::Mint {
                        to: m.to.clone(),
                        amount: m.amount,
                    }
                    .encode(),
                    (None, Some(raw)) => hex::decode(raw).context("call_data is not hex")?,
                    (None, None) => Vec::new(),
                };
                let recipient = recipient.clone().unwrap_or_else(|| self.token_address.clone());
                let id =
                    self.engine
                        .add_proposal(caller, recipient, call_data, description.clone())?;
                json!({ "proposal": id.raw() })
            }
            Step::Vote {
                caller,
                proposal,
                support,
            } => {
                let weight = self
                    .engine
                    .vote(caller, ProposalId::new(*proposal), *support)?;
                json!({ "weight": weight })
            }
            Step::Advance { secs } => {
                self.clock.advance(*secs);
                json!({ "now": self.clock_now() })
            }
            Step::Finish { caller, proposal } => {
                let outcome = self
                    .engine
                    .finish_proposal(caller, ProposalId::new(*proposal))?;
                json!({ "outcome": outcome })
            }
        })
    }

    fn clock_now(&self) -> u64 {
        self.clock.now().as_secs()
    }

    /// Every proposal and every account's token and locked balance.
    pub fn state(&self) -> Value {
        let proposals: Vec<Value> = self
            .engine
            .proposals()
            .map(|p| {
                json!({
                    "id": p.id.raw(),
                    "description": p.description,
                    "recipient": p.recipient,
                    "call_data": hex::encode(&p.call_data),
                    "votes_for": p.votes_for,
                    "votes_against": p.votes_against,
                    "finished": p.finished,
                    "outcome": p.outcome,
                })
            })
            .collect();
        let accounts: Vec<Value> = self
            .accounts
            .iter()
            .map(|a| {
                json!({
                    "address": a,
                    "balance": self.token.balance_of(a),
                    "locked": self.engine.get_user_balance(a),
                    "voting_on": self.engine.voting_proposal_of(a).map(|id| id.raw()),
                })
            })
            .collect();
        let open: Vec<u64> = self.engine.open_proposals().map(|p| p.id.raw()).collect();
        json!({
            "now": self.clock_now(),
            "open_proposals": open,
            "total_supply": self.token.total_supply(),
            "escrow_balance": self.token.balance_of(&self.engine.config().escrow),
            "proposals": proposals,
            "accounts": accounts,
        })
    }

    pub fn snapshot(&self) -> anyhow::Result<Vec<u8>> {
        Ok(self.engine.snapshot()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_governance::ProposalOutcome;

    const SCENARIO: &str = r#"{
        "token": "token",
        "token_owner": "owner",
        "start_time": 1000,
        "steps": [
            { "step": "mint", "to": "alice", "amount": 1000 },
            { "step": "mint", "to": "bob", "amount": 500 },
            { "step": "propose", "caller": "chair", "description": "Mint 333 tokens to carol",
              "mint": { "to": "carol", "amount": 333 } },
            { "step": "approve", "owner": "alice", "amount": 1000 },
            { "step": "top_up", "caller": "alice", "amount": 1000 },
            { "step": "vote", "caller": "alice", "proposal": 1, "support": true },
            { "step": "reduce", "caller": "alice", "amount": 1 },
            { "step": "advance", "secs": 300 },
            { "step": "finish", "caller": "bob", "proposal": 1 },
            { "step": "reduce", "caller": "alice", "amount": 1000 }
        ]
    }"#;

    fn config() -> GovernanceConfig {
        GovernanceConfig::new(Address::new("chair"), Address::new("dao"), 30, 300).unwrap()
    }

    fn outcome(replay: &Replay, id: u64) -> Option<ProposalOutcome> {
        replay
            .engine
            .get_proposal(ProposalId::new(id))
            .ok()
            .map(|p| p.outcome.clone())
    }

    fn replay(raw: &str) -> (Replay, Vec<StepReport>) {
        let scenario: Scenario = serde_json::from_str(raw).unwrap();
        let mut replay = Replay::new(config(), &scenario).unwrap();
        let reports = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| replay.apply(i, step))
            .collect();
        (replay, reports)
    }

    #[test]
    fn mint_proposal_passes_and_pays_out() {
        let (replay, reports) = replay(SCENARIO);

        let failed: Vec<_> = reports.iter().filter(|r| !r.ok).map(|r| r.index).collect();
        assert_eq!(failed, vec![6], "only the locked withdrawal fails");
        assert!(reports[6].error.as_deref().unwrap().contains("locked"));
        assert_eq!(outcome(&replay, 1), Some(ProposalOutcome::Executed));

        let state = replay.state();
        assert_eq!(state["total_supply"], json!("1833"));
        assert_eq!(state["open_proposals"], json!([]));
        let carol = state["accounts"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["address"] == json!("carol"))
            .unwrap();
        assert_eq!(carol["balance"], json!("333"));
        assert_eq!(state["escrow_balance"], json!("0"));
    }

    #[test]
    fn demo_scenario_replays_cleanly() {
        let (replay, reports) = replay(include_str!("../../demos/mint-proposal.json"));
        assert!(reports.iter().all(|r| r.ok));
        assert!(matches!(
            outcome(&replay, 1),
            Some(ProposalOutcome::Rejected(_))
        ));
        assert_eq!(outcome(&replay, 2), Some(ProposalOutcome::Executed));
    }

    #[test]
    fn rejects_ambiguous_payload() {
        let (_, reports) = replay(
            r#"{ "steps": [
                { "step": "propose", "caller": "chair", "call_data": "00",
                  "mint": { "to": "carol", "amount": 1 } },
                { "step": "propose", "caller": "chair", "call_data": "zz" },
                { "step": "propose", "caller": "chair", "call_data": "beef" }
            ] }"#,
        );
        assert!(!reports[0].ok);
        assert!(!reports[1].ok);
        assert!(reports[2].ok);
        assert_eq!(reports[2].result, json!({ "proposal": 1 }));
    }

    #[test]
    fn eighteen_decimal_amounts_replay_exactly() {
        let (replay, reports) = replay(
            r#"{
            "token_owner": "owner",
            "steps": [
                { "step": "mint", "to": "alice", "amount": "1000000000000000000000" },
                { "step": "mint", "to": "bob", "amount": "500000000000000000000" },
                { "step": "approve", "owner": "alice", "amount": "1000000000000000000000" },
                { "step": "top_up", "caller": "alice", "amount": "1000000000000000000000" },
                { "step": "propose", "caller": "chair", "description": "Mint 333 tokens to carol",
                  "mint": { "to": "carol", "amount": "333000000000000000000" } },
                { "step": "vote", "caller": "alice", "proposal": 1, "support": true },
                { "step": "advance", "secs": 300 },
                { "step": "finish", "caller": "bob", "proposal": 1 }
            ]
        }"#,
        );
        assert!(reports.iter().all(|r| r.ok));
        assert_eq!(
            reports[5].result,
            json!({ "weight": "1000000000000000000000" })
        );

        let state = replay.state();
        assert_eq!(state["total_supply"], json!("1833000000000000000000"));
        assert_eq!(state["escrow_balance"], json!("1000000000000000000000"));
        let report = serde_json::to_string(&state).unwrap();
        assert!(report.contains("333000000000000000000"));
    }

    #[test]
    fn amounts_past_u64_must_be_strings() {
        let parsed = serde_json::from_str::<Scenario>(
            r#"{ "steps": [ { "step": "mint", "to": "alice", "amount": 1000000000000000000000 } ] }"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_step_is_a_parse_error() {
        let parsed = serde_json::from_str::<Scenario>(r#"{ "steps": [ { "step": "burn" } ] }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn snapshot_written_after_replay_restores() {
        let (replay, _) = replay(SCENARIO);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");
        std::fs::write(&path, replay.snapshot().unwrap()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let restored: Engine = GovernanceEngine::restore(
            &bytes,
            replay.token.clone(),
            ActionRouter::new(),
            replay.clock.clone(),
        )
        .unwrap();
        assert_eq!(restored.get_proposal_count(), 1);
        assert_eq!(restored.config().quorum_percent, 30);
    }
}
