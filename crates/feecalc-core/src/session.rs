use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::{default_offer, default_offers, default_scenario, offer_name_for_position};
use crate::error::FeeCalcError;
use crate::evaluator::{evaluate_offer, CalculationResult};
use crate::offer::{check_offer_set, palette_color, FeeAmount, HurdleTier, ManagementFeeBasis, Offer};
use crate::scenario::{PriceMode, Scenario, DEFAULT_SHARES_OUTSTANDING};
use crate::sensitivity::{compute_sensitivity, SensitivityPoint, DEFAULT_SENSITIVITY_STEPS};
use crate::types::{Money, Rate, MAX_OFFERS};
use crate::FeeCalcResult;

/// Schema version written by [`Session::to_file`].
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

const PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Current schema
// ---------------------------------------------------------------------------

/// On-disk session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    pub scenario: Scenario,
    pub offers: Vec<Offer>,
}

/// A scenario and its 1 to 5 offers, structurally checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub scenario: Scenario,
    pub offers: Vec<Offer>,
}

impl Session {
    pub fn new(scenario: Scenario, offers: Vec<Offer>) -> FeeCalcResult<Self> {
        check_offer_set(&offers)?;
        Ok(Self { scenario, offers })
    }

    pub fn to_file(&self) -> SessionFile {
        SessionFile {
            version: CURRENT_SCHEMA_VERSION,
            scenario: self.scenario.clone(),
            offers: self.offers.clone(),
        }
    }

    pub fn to_json(&self) -> FeeCalcResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }
}

impl Default for Session {
    /// Default scenario with the two presets.
    fn default() -> Self {
        Self {
            scenario: default_scenario(),
            offers: default_offers(),
        }
    }
}

// ---------------------------------------------------------------------------
// Legacy schema (version 1): camelCase, percent units
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
enum LegacyPriceMode {
    #[default]
    #[serde(rename = "pps")]
    PerShare,
    #[serde(rename = "valuation")]
    Valuation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LegacyFeeBasis {
    #[default]
    Committed,
    Invested,
    Nav,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyScenario {
    investment_amount: Money,
    exit_price_per_share: Money,
    time_horizon: u32,
    #[serde(default)]
    price_mode: LegacyPriceMode,
    #[serde(default)]
    exit_valuation: Money,
    #[serde(default)]
    shares_outstanding: Option<Money>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTier {
    moic_floor: Decimal,
    moic_ceiling: Decimal,
    /// Percent units
    carry_rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyOffer {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    price_per_share: Money,
    #[serde(default)]
    management_fee_percent: Decimal,
    #[serde(default)]
    management_fee_basis: LegacyFeeBasis,
    #[serde(default)]
    carry_percent: Decimal,
    #[serde(default)]
    hurdle_rate_percent: Decimal,
    #[serde(default)]
    catch_up_percent: Decimal,
    #[serde(default)]
    setup_fee: Decimal,
    #[serde(default)]
    setup_fee_is_percent: bool,
    #[serde(default)]
    placement_fee_percent: Decimal,
    #[serde(default)]
    admin_fee: Decimal,
    #[serde(default)]
    admin_fee_is_percent: bool,
    #[serde(default)]
    hurdle_tiers: Vec<LegacyTier>,
}

#[derive(Debug, Deserialize)]
struct LegacySessionFile {
    scenario: LegacyScenario,
    offers: Vec<LegacyOffer>,
}

fn rate_from_percent(percent: Decimal) -> Rate {
    percent / PERCENT
}

fn fee_from_legacy(amount: Decimal, is_percent: bool) -> FeeAmount {
    if is_percent {
        FeeAmount::Percent(rate_from_percent(amount))
    } else {
        FeeAmount::Flat(amount)
    }
}

impl LegacyScenario {
    fn migrate(self) -> Scenario {
        let shares_outstanding = self
            .shares_outstanding
            .filter(|shares| !shares.is_zero())
            .unwrap_or(DEFAULT_SHARES_OUTSTANDING);
        Scenario {
            investment_amount: self.investment_amount,
            exit_price_per_share: self.exit_price_per_share,
            time_horizon: self.time_horizon,
            price_mode: match self.price_mode {
                LegacyPriceMode::PerShare => PriceMode::PerShare,
                LegacyPriceMode::Valuation => PriceMode::Valuation,
            },
            exit_valuation: self.exit_valuation,
            shares_outstanding,
        }
    }
}

impl LegacyOffer {
    fn migrate(self, position: usize) -> Offer {
        Offer {
            id: self.id.unwrap_or_else(|| format!("offer-{}", position + 1)),
            name: self
                .name
                .unwrap_or_else(|| offer_name_for_position(position)),
            color: self
                .color
                .unwrap_or_else(|| palette_color(position).to_string()),
            price_per_share: self.price_per_share,
            management_fee_rate: rate_from_percent(self.management_fee_percent),
            management_fee_basis: match self.management_fee_basis {
                LegacyFeeBasis::Committed => ManagementFeeBasis::CommittedCapital,
                LegacyFeeBasis::Invested => ManagementFeeBasis::InvestedCapital,
                LegacyFeeBasis::Nav => ManagementFeeBasis::NetAssetValue,
            },
            admin_fee: fee_from_legacy(self.admin_fee, self.admin_fee_is_percent),
            setup_fee: fee_from_legacy(self.setup_fee, self.setup_fee_is_percent),
            placement_fee_rate: rate_from_percent(self.placement_fee_percent),
            carry_rate: rate_from_percent(self.carry_percent),
            hurdle_rate: rate_from_percent(self.hurdle_rate_percent),
            catch_up_rate: rate_from_percent(self.catch_up_percent),
            hurdle_tiers: self
                .hurdle_tiers
                .into_iter()
                .map(|tier| HurdleTier {
                    moic_floor: tier.moic_floor,
                    moic_ceiling: tier.moic_ceiling,
                    carry_rate: rate_from_percent(tier.carry_rate),
                })
                .collect(),
        }
    }
}

impl LegacySessionFile {
    fn migrate(self) -> Session {
        Session {
            scenario: self.scenario.migrate(),
            offers: self
                .offers
                .into_iter()
                .enumerate()
                .map(|(position, offer)| offer.migrate(position))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load path
// ---------------------------------------------------------------------------

fn schema_version(doc: &serde_json::Value) -> FeeCalcResult<u32> {
    match doc.get("version") {
        None | Some(serde_json::Value::Null) => Ok(1),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| FeeCalcError::InvalidInput {
                field: "version".into(),
                reason: "Must be a non-negative integer".into(),
            }),
    }
}

/// Load a session document of any supported version and migrate it to the
/// current in-memory shape.
///
/// Documents without a `version` field are treated as version 1. A legacy
/// browser-storage envelope (`{"state": {...}, "version": 0}`) is unwrapped
/// and treated as version 1 as well. Missing optional fields take their
/// defaults; offer count and id uniqueness are checked after migration.
pub fn load_session(json: &str) -> FeeCalcResult<Session> {
    let mut doc: serde_json::Value = serde_json::from_str(json)?;

    let storage_state = doc
        .get_mut("state")
        .filter(|state| state.is_object())
        .map(serde_json::Value::take);
    let (doc, version) = match storage_state {
        Some(state) => (state, 1),
        None => {
            let version = schema_version(&doc)?;
            (doc, version)
        }
    };
    debug!(version, "loading session document");

    let session = match version {
        1 => serde_json::from_value::<LegacySessionFile>(doc)?.migrate(),
        CURRENT_SCHEMA_VERSION => {
            let file: SessionFile = serde_json::from_value(doc)?;
            Session {
                scenario: file.scenario,
                offers: file.offers,
            }
        }
        found => {
            return Err(FeeCalcError::UnsupportedSchemaVersion {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            })
        }
    };

    check_offer_set(&session.offers)?;
    Ok(session)
}

// ---------------------------------------------------------------------------
// Workbench
// ---------------------------------------------------------------------------

/// Derived outputs for the current inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub results: Vec<CalculationResult>,
    pub sensitivity: Vec<SensitivityPoint>,
}

impl Evaluation {
    pub fn compute(scenario: &Scenario, offers: &[Offer], sensitivity_steps: u32) -> Self {
        Self {
            results: offers.iter().map(|o| evaluate_offer(scenario, o)).collect(),
            sensitivity: compute_sensitivity(scenario, offers, sensitivity_steps),
        }
    }
}

/// Editable session whose evaluation is recomputed wholesale after every
/// change.
#[derive(Debug, Clone)]
pub struct Workbench {
    scenario: Scenario,
    offers: Vec<Offer>,
    sensitivity_steps: u32,
    next_id: usize,
    evaluation: Evaluation,
}

impl Workbench {
    pub fn new(session: Session) -> Self {
        Self::with_steps(session, DEFAULT_SENSITIVITY_STEPS)
    }

    pub fn with_steps(session: Session, sensitivity_steps: u32) -> Self {
        let evaluation =
            Evaluation::compute(&session.scenario, &session.offers, sensitivity_steps);
        Self {
            next_id: session.offers.len() + 1,
            scenario: session.scenario,
            offers: session.offers,
            sensitivity_steps,
            evaluation,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn results(&self) -> &[CalculationResult] {
        &self.evaluation.results
    }

    pub fn sensitivity(&self) -> &[SensitivityPoint] {
        &self.evaluation.sensitivity
    }

    #[cfg(feature = "comparison")]
    pub fn comparison(&self) -> crate::comparison::ComparisonTable {
        crate::comparison::compare_results(&self.evaluation.results)
    }

    pub fn session(&self) -> Session {
        Session {
            scenario: self.scenario.clone(),
            offers: self.offers.clone(),
        }
    }

    pub fn update_scenario(&mut self, edit: impl FnOnce(&mut Scenario)) {
        edit(&mut self.scenario);
        self.recompute();
    }

    /// Edit one offer's terms. The id is fixed; changes to it are discarded.
    pub fn update_offer(&mut self, id: &str, edit: impl FnOnce(&mut Offer)) -> FeeCalcResult<()> {
        let offer = self
            .offers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| FeeCalcError::UnknownOffer(id.to_string()))?;
        edit(offer);
        offer.id = id.to_string();
        self.recompute();
        Ok(())
    }

    /// Append a fee-free offer. Returns its id.
    pub fn add_offer(&mut self) -> FeeCalcResult<String> {
        self.ensure_capacity()?;
        let position = self.offers.len();
        let id = self.allocate_id();
        let offer = default_offer(
            &id,
            &offer_name_for_position(position),
            palette_color(position),
        );
        self.offers.push(offer);
        self.recompute();
        Ok(id)
    }

    /// Append a copy of an existing offer's terms. Returns the copy's id.
    pub fn duplicate_offer(&mut self, id: &str) -> FeeCalcResult<String> {
        self.ensure_capacity()?;
        let source = self
            .offers
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| FeeCalcError::UnknownOffer(id.to_string()))?;
        let copy = Offer {
            id: String::new(),
            name: format!("{} (copy)", source.name),
            color: palette_color(self.offers.len()).to_string(),
            ..source.clone()
        };
        let new_id = self.allocate_id();
        self.offers.push(Offer {
            id: new_id.clone(),
            ..copy
        });
        self.recompute();
        Ok(new_id)
    }

    pub fn remove_offer(&mut self, id: &str) -> FeeCalcResult<()> {
        let index = self
            .offers
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| FeeCalcError::UnknownOffer(id.to_string()))?;
        if self.offers.len() == 1 {
            return Err(FeeCalcError::InvalidInput {
                field: "offers".into(),
                reason: "At least one offer is required".into(),
            });
        }
        self.offers.remove(index);
        self.recompute();
        Ok(())
    }

    fn ensure_capacity(&self) -> FeeCalcResult<()> {
        if self.offers.len() >= MAX_OFFERS {
            return Err(FeeCalcError::InvalidInput {
                field: "offers".into(),
                reason: format!("At most {MAX_OFFERS} offers can be compared"),
            });
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let id = format!("offer-{}", self.next_id);
            self.next_id += 1;
            if !self.offers.iter().any(|o| o.id == id) {
                return id;
            }
        }
    }

    fn recompute(&mut self) {
        self.evaluation = Evaluation::compute(&self.scenario, &self.offers, self.sensitivity_steps);
        debug!(
            offers = self.offers.len(),
            points = self.evaluation.sensitivity.len(),
            "workbench recomputed"
        );
    }
}
