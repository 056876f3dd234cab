//! Unspent output selection for building transfers.
//!
//! Two strategies are provided. [`BuildWithOrder`] covers token amounts first
//! and then ALPH, walking candidates in an [`AssetOrder`]. [`Build`] covers
//! ALPH only and picks, at each step, the output closest to the amount still
//! missing, avoiding change below the dust threshold.

use core::cmp::Ordering;
use core::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{
    AssetOutput, AssetOutputRef, GasBox, GasPrice, TokenId, TxInput, UnlockScript, DUST_AMOUNT,
};

/// Where a candidate output currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputType {
    /// Included in a block.
    Persisted,
    /// Created by a transaction still in the mempool.
    Mempool,
}

impl OutputType {
    /// Lower levels are preferred by every [`AssetOrder`].
    pub fn cached_level(self) -> u8 {
        match self {
            OutputType::Persisted => 0,
            OutputType::Mempool => 1,
        }
    }
}

/// Spendable output together with its reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOutputInfo {
    /// Where the output lives.
    pub output_ref: AssetOutputRef,
    /// The output itself.
    pub output: AssetOutput,
    /// Whether the output is confirmed or still pending.
    pub output_type: OutputType,
}

impl AssetOutputInfo {
    /// Amount of `id` carried by the output. Only the first entry for a
    /// token counts.
    pub fn token_amount(&self, id: &TokenId) -> Option<U256> {
        self.output
            .tokens
            .iter()
            .find(|(token, _)| token == id)
            .map(|(_, amount)| *amount)
    }

    fn level(&self) -> u8 {
        self.output_type.cached_level()
    }
}

impl TxInput {
    /// Input spending `asset` with the given unlock data.
    pub fn from_asset(asset: &AssetOutputInfo, unlock_script: UnlockScript) -> Self {
        TxInput {
            output_ref: asset.output_ref,
            unlock_script,
        }
    }
}

/// Why no selection could be made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The candidates do not hold enough of an asset. `token` is `None` for
    /// ALPH.
    NotEnoughBalance {
        /// Asset that ran short.
        token: Option<TokenId>,
        /// Amount that had to be covered.
        required: U256,
        /// Amount the candidates hold.
        available: U256,
    },
    /// Every candidate is used and the change is still below the dust
    /// threshold.
    DustChange {
        /// Change left after spending every candidate.
        change: U256,
    },
    /// Amount plus fee overflows 256 bits.
    InvalidAmount,
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::NotEnoughBalance {
                token: Some(token),
                required,
                available,
            } => write!(
                f,
                "not enough balance of token {token}: required {required}, available {available}"
            ),
            SelectError::NotEnoughBalance {
                token: None,
                required,
                available,
            } => write!(
                f,
                "not enough ALPH balance: required {required}, available {available}"
            ),
            SelectError::DustChange { change } => {
                write!(f, "change of {change} is below the dust amount")
            }
            SelectError::InvalidAmount => write!(f, "amount plus fee overflows"),
        }
    }
}

impl std::error::Error for SelectError {}

/// Result alias for selection.
pub type SelectResult<T> = Result<T, SelectError>;

/// Preference order over candidate outputs.
pub trait AssetOrder {
    /// Order used when covering ALPH.
    fn by_alph(&self, x: &AssetOutputInfo, y: &AssetOutputInfo) -> Ordering;

    /// Order used when covering token `id`.
    fn by_token(&self, id: &TokenId, x: &AssetOutputInfo, y: &AssetOutputInfo) -> Ordering;
}

/// Lowest cached level first, then smallest amount.
///
/// For a token, holders of the token come before non-holders; holders are
/// ordered by level, token amount, then ALPH amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascending;

impl AssetOrder for Ascending {
    fn by_alph(&self, x: &AssetOutputInfo, y: &AssetOutputInfo) -> Ordering {
        x.level()
            .cmp(&y.level())
            .then_with(|| x.output.amount.cmp(&y.output.amount))
    }

    fn by_token(&self, id: &TokenId, x: &AssetOutputInfo, y: &AssetOutputInfo) -> Ordering {
        match (x.token_amount(id), y.token_amount(id)) {
            (Some(amount_x), Some(amount_y)) => x
                .level()
                .cmp(&y.level())
                .then(amount_x.cmp(&amount_y))
                .then_with(|| self.by_alph(x, y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.by_alph(x, y),
        }
    }
}

/// Exact reverse of [`Ascending`], including the token holder preference.
#[derive(Debug, Clone, Copy, Default)]
pub struct Descending;

impl AssetOrder for Descending {
    fn by_alph(&self, x: &AssetOutputInfo, y: &AssetOutputInfo) -> Ordering {
        Ascending.by_alph(x, y).reverse()
    }

    fn by_token(&self, id: &TokenId, x: &AssetOutputInfo, y: &AssetOutputInfo) -> Ordering {
        Ascending.by_token(id, x, y).reverse()
    }
}

/// Amounts a transfer has to cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmounts {
    /// ALPH in atto-ALPH.
    pub alph: U256,
    /// Covered in this order.
    pub tokens: Vec<(TokenId, U256)>,
}

/// Gas settings supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidedGas {
    /// Gas reserved.
    pub gas: GasBox,
    /// Price per gas unit.
    pub gas_price: GasPrice,
}

impl ProvidedGas {
    /// Fee the reserved gas costs at the given price.
    pub fn fee(&self) -> U256 {
        self.gas_price.fee(self.gas)
    }
}

/// Outputs chosen for a transfer and the gas it reserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    /// Outputs to spend.
    pub assets: Vec<AssetOutputInfo>,
    /// Gas the transfer reserves.
    pub gas: GasBox,
}

/// Intermediate result of [`SelectionWithoutGasEstimation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSoFar {
    /// ALPH held by `selected`.
    pub alph: U256,
    /// Token-covering outputs first, then ALPH-covering outputs.
    pub selected: Vec<AssetOutputInfo>,
    /// Candidates left untouched.
    pub rest: Vec<AssetOutputInfo>,
}

fn total_alph(assets: &[AssetOutputInfo]) -> U256 {
    assets
        .iter()
        .fold(U256::zero(), |acc, asset| acc.saturating_add(asset.output.amount))
}

fn total_token(assets: &[AssetOutputInfo], id: &TokenId) -> U256 {
    assets.iter().fold(U256::zero(), |acc, asset| {
        acc.saturating_add(asset.token_amount(id).unwrap_or_default())
    })
}

/// Takes a prefix of `sorted` whose running total reaches `amount`.
fn select_for_amount<F>(
    amount: U256,
    mut sorted: Vec<AssetOutputInfo>,
    token: Option<TokenId>,
    amount_of: F,
) -> SelectResult<(Vec<AssetOutputInfo>, Vec<AssetOutputInfo>)>
where
    F: Fn(&AssetOutputInfo) -> U256,
{
    if amount.is_zero() {
        return Ok((Vec::new(), sorted));
    }
    let mut sum = U256::zero();
    let mut taken = 0;
    for asset in &sorted {
        if sum >= amount {
            break;
        }
        sum = sum.saturating_add(amount_of(asset));
        taken += 1;
    }
    if sum < amount {
        return Err(SelectError::NotEnoughBalance {
            token,
            required: amount,
            available: sum,
        });
    }
    let rest = sorted.split_off(taken);
    Ok((sorted, rest))
}

/// Greedy selection in a fixed [`AssetOrder`], without gas estimation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionWithoutGasEstimation<O> {
    order: O,
}

impl<O: AssetOrder> SelectionWithoutGasEstimation<O> {
    /// Selects in `order`.
    pub fn new(order: O) -> Self {
        Self { order }
    }

    /// Covers every requested token, then the ALPH those outputs do not
    /// already hold.
    pub fn select(
        &self,
        amounts: &AssetAmounts,
        utxos: Vec<AssetOutputInfo>,
    ) -> SelectResult<SelectedSoFar> {
        let (mut selected, remaining) = self.select_for_tokens(&amounts.tokens, utxos)?;
        let alph_to_select = amounts.alph.saturating_sub(total_alph(&selected));
        let (for_alph, rest) = select_for_amount(
            alph_to_select,
            self.sort_alph(remaining),
            None,
            |asset| asset.output.amount,
        )?;
        selected.extend(for_alph);
        Ok(SelectedSoFar {
            alph: total_alph(&selected),
            selected,
            rest,
        })
    }

    fn select_for_tokens(
        &self,
        tokens: &[(TokenId, U256)],
        utxos: Vec<AssetOutputInfo>,
    ) -> SelectResult<(Vec<AssetOutputInfo>, Vec<AssetOutputInfo>)> {
        let mut selected = Vec::new();
        let mut rest = utxos;
        for (id, amount) in tokens {
            rest.sort_by(|x, y| self.order.by_token(id, x, y));
            let missing = amount.saturating_sub(total_token(&selected, id));
            let (found, left) = select_for_amount(missing, rest, Some(*id), |asset| {
                asset.token_amount(id).unwrap_or_default()
            })?;
            selected.extend(found);
            rest = left;
        }
        Ok((selected, rest))
    }

    /// Token-free outputs first so ALPH selection does not sweep up tokens.
    fn sort_alph(&self, assets: Vec<AssetOutputInfo>) -> Vec<AssetOutputInfo> {
        let (mut plain, mut with_tokens): (Vec<_>, Vec<_>) = assets
            .into_iter()
            .partition(|asset| asset.output.tokens.is_empty());
        plain.sort_by(|x, y| self.order.by_alph(x, y));
        with_tokens.sort_by(|x, y| self.order.by_alph(x, y));
        plain.extend(with_tokens);
        plain
    }
}

/// Ordered selection with the fee added to the ALPH target.
#[derive(Debug, Clone, Copy)]
pub struct BuildWithOrder<O> {
    provided_gas: ProvidedGas,
    order: O,
}

impl<O: AssetOrder + Copy> BuildWithOrder<O> {
    /// Pays for `provided_gas` and selects in `order`.
    pub fn new(provided_gas: ProvidedGas, order: O) -> Self {
        Self {
            provided_gas,
            order,
        }
    }

    /// Covers the requested tokens and `amounts.alph` plus the fee.
    pub fn select(
        &self,
        amounts: &AssetAmounts,
        utxos: Vec<AssetOutputInfo>,
    ) -> SelectResult<Selected> {
        let with_gas = AssetAmounts {
            alph: amounts.alph.saturating_add(self.provided_gas.fee()),
            tokens: amounts.tokens.clone(),
        };
        let so_far = SelectionWithoutGasEstimation::new(self.order).select(&with_gas, utxos)?;
        debug!(
            selected = so_far.selected.len(),
            untouched = so_far.rest.len(),
            "ordered selection complete"
        );
        Ok(Selected {
            assets: so_far.selected,
            gas: self.provided_gas.gas,
        })
    }
}

/// ALPH-only selection minimising the number of outputs.
#[derive(Debug, Clone, Copy)]
pub struct Build {
    provided_gas: ProvidedGas,
}

impl Build {
    /// Pays for `provided_gas`; change below [`DUST_AMOUNT`] is avoided.
    pub fn new(provided_gas: ProvidedGas) -> Self {
        Self { provided_gas }
    }

    /// Covers `amounts.alph` plus the fee. Token amounts are ignored.
    pub fn select(
        &self,
        amounts: &AssetAmounts,
        utxos: Vec<AssetOutputInfo>,
    ) -> SelectResult<Selected> {
        let assets = select_minimum_utxos(
            utxos,
            amounts.alph,
            self.provided_gas.fee(),
            Some(U256::from(DUST_AMOUNT)),
        )?;
        Ok(Selected {
            assets,
            gas: self.provided_gas.gas,
        })
    }
}

/// [`select_minimum_utxos_by`] over ALPH amounts.
pub fn select_minimum_utxos(
    utxos: Vec<AssetOutputInfo>,
    amount: U256,
    fee: U256,
    dust: Option<U256>,
) -> SelectResult<Vec<AssetOutputInfo>> {
    select_minimum_utxos_by(utxos, amount, fee, dust, |asset| asset.output.amount)
}

/// Picks outputs whose total covers `amount + fee`.
///
/// Each step takes the unused output closest to the amount still missing:
/// an exact match if one exists, otherwise the smallest output above it, or
/// the largest output when none is big enough. If the resulting change is
/// non-zero but below `dust`, the smallest unused output is added as well.
///
/// When the inputs cannot cover the target, all of them are returned so the
/// caller can report the shortfall. The result is sorted by descending
/// amount.
pub fn select_minimum_utxos_by<T, F>(
    utxos: Vec<T>,
    amount: U256,
    fee: U256,
    dust: Option<U256>,
    amount_of: F,
) -> SelectResult<Vec<T>>
where
    F: Fn(&T) -> U256,
{
    let target = amount.checked_add(fee).ok_or(SelectError::InvalidAmount)?;
    let available = utxos
        .iter()
        .fold(U256::zero(), |acc, utxo| acc.saturating_add(amount_of(utxo)));

    let mut unused = utxos;
    if available < target {
        debug!(%available, %target, "insufficient funds, returning every output");
        unused.sort_by(|x, y| amount_of(y).cmp(&amount_of(x)));
        return Ok(unused);
    }

    unused.sort_by(|x, y| amount_of(x).cmp(&amount_of(y)));
    let mut selected = Vec::new();
    let mut total = U256::zero();
    while total < target && !unused.is_empty() {
        let missing = target - total;
        let index = match unused.binary_search_by(|utxo| amount_of(utxo).cmp(&missing)) {
            Ok(index) => index,
            Err(index) if index == unused.len() => index - 1,
            Err(index) => index,
        };
        let utxo = unused.remove(index);
        total = total.saturating_add(amount_of(&utxo));
        selected.push(utxo);
    }

    let change = total - target;
    if let Some(dust) = dust {
        if !change.is_zero() && change < dust {
            if unused.is_empty() {
                return Err(SelectError::DustChange { change });
            }
            let utxo = unused.remove(0);
            total = total.saturating_add(amount_of(&utxo));
            selected.push(utxo);
        }
    }

    debug!(selected = selected.len(), %total, "minimum selection complete");
    selected.sort_by(|x, y| amount_of(y).cmp(&amount_of(x)));
    Ok(selected)
}
