//! Form validation for token creation requests.
//!
//! Every rule is checked and every failure collected, so the form can mark
//! all bad fields at once. Field names are the camelCase keys the form uses.
//! A request that fails here never reaches a wallet or an RPC node.

use std::fmt;

use serde::Serialize;

use crate::error::ForgeError;
use crate::networks::ChainFamily;
use crate::types::{EvmTokenRequest, SolanaTokenRequest, TokenCreationRequest};

const EVM_NAME_MAX: usize = 50;
const SOLANA_NAME_MAX: usize = 32;
const SYMBOL_MAX: usize = 10;
const EVM_DECIMALS_MAX: u8 = 18;
const SOLANA_DECIMALS_MAX: u8 = 9;
const TAX_PERCENTAGE_MAX: u8 = 25;
const EVM_DESCRIPTION_MAX: usize = 500;
const SOLANA_DESCRIPTION_MAX: usize = 200;
const SOCIAL_HANDLE_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field failure found in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages reported against `field`, in the order they were found.
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    fn into_result(self) -> Result<(), ForgeError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ForgeError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Validate a request of either family.
pub fn validate_request(request: &TokenCreationRequest) -> Result<(), ForgeError> {
    match request {
        TokenCreationRequest::Evm(req) => validate_evm_request(req),
        TokenCreationRequest::Solana(req) => validate_solana_request(req),
    }
}

// ─── EVM ─────────────────────────────────────────────────────────────

pub fn validate_evm_request(req: &EvmTokenRequest) -> Result<(), ForgeError> {
    let mut errors = ValidationErrors::default();

    check_name(&mut errors, &req.name, EVM_NAME_MAX);
    check_symbol(&mut errors, &req.symbol);

    if req.decimals > EVM_DECIMALS_MAX {
        errors.push("decimals", format!("Decimals must be between 0 and {EVM_DECIMALS_MAX}"));
    }

    let total = req.total_supply.trim();
    let total_value = if total.is_empty() {
        errors.push("totalSupply", "Total supply is required");
        None
    } else {
        match parse_number(total) {
            Some(v) if v > 0.0 => Some(v),
            _ => {
                errors.push("totalSupply", "Total supply must be a positive number");
                None
            }
        }
    };

    let max = req.max_supply.as_deref().map(str::trim).unwrap_or("");
    let max_value = if max.is_empty() {
        None
    } else {
        match parse_number(max) {
            Some(v) if v > 0.0 => Some(v),
            _ => {
                errors.push("maxSupply", "Max supply must be a positive number");
                None
            }
        }
    };

    if req.tax_percentage > TAX_PERCENTAGE_MAX {
        errors.push(
            "taxPercentage",
            format!("Tax percentage must be between 0 and {TAX_PERCENTAGE_MAX}"),
        );
    }

    if let Some(description) = &req.description {
        if description.chars().count() > EVM_DESCRIPTION_MAX {
            errors.push("description", "Description too long");
        }
    }

    if req.chain.family() != ChainFamily::Evm {
        errors.push("chainId", format!("{} is not an EVM network", req.chain));
    }

    if req.has_tax {
        if req.tax_percentage == 0 {
            errors.push(
                "taxPercentage",
                "Tax percentage must be greater than 0 when tax feature is enabled",
            );
        }
        let treasury = req.treasury_wallet.trim();
        if treasury.is_empty() {
            errors.push(
                "treasuryWallet",
                "Treasury wallet address is required when tax feature is enabled",
            );
        } else if !chain_eth::is_valid_address(treasury) {
            errors.push("treasuryWallet", "Invalid treasury wallet address");
        }
    }

    if req.is_capped {
        if max.is_empty() {
            errors.push(
                "maxSupply",
                "Maximum supply is required when capped feature is enabled",
            );
        } else if let (Some(total_value), Some(max_value)) = (total_value, max_value) {
            if !max_covers_total(total, max, total_value, max_value, req.decimals) {
                errors.push(
                    "maxSupply",
                    "Maximum supply must be greater than or equal to initial supply",
                );
            }
        }
    }

    errors.into_result()
}

/// Compares in base units when both amounts convert exactly, so large
/// supplies are not rounded through f64.
fn max_covers_total(total: &str, max: &str, total_value: f64, max_value: f64, decimals: u8) -> bool {
    match (
        chain_eth::parse_units(total, decimals),
        chain_eth::parse_units(max, decimals),
    ) {
        (Ok(total_units), Ok(max_units)) => max_units >= total_units,
        _ => max_value >= total_value,
    }
}

// ─── Solana ──────────────────────────────────────────────────────────

pub fn validate_solana_request(req: &SolanaTokenRequest) -> Result<(), ForgeError> {
    let mut errors = ValidationErrors::default();

    check_name(&mut errors, &req.name, SOLANA_NAME_MAX);
    check_symbol(&mut errors, &req.symbol);

    if req.decimals > SOLANA_DECIMALS_MAX {
        errors.push(
            "decimals",
            format!("Decimals must be between 0 and {SOLANA_DECIMALS_MAX}"),
        );
    }

    let total = req.total_supply.trim();
    if !total.is_empty() && total != "0" {
        let plain = total.bytes().all(|b| b.is_ascii_digit() || b == b'.');
        if !plain || !matches!(parse_number(total), Some(v) if v >= 0.0) {
            errors.push(
                "totalSupply",
                "Total supply must be a number or 0 for unlimited supply",
            );
        } else if req.decimals <= SOLANA_DECIMALS_MAX
            && chain_sol::parse_ui_amount(total, req.decimals).is_err()
        {
            errors.push(
                "totalSupply",
                format!("Total supply is too large for {} decimals", req.decimals),
            );
        }
    }

    if let Some(description) = &req.description {
        if description.chars().count() > SOLANA_DESCRIPTION_MAX {
            errors.push("description", "Description too long");
        }
    }

    if let Some(website) = req.website.as_deref() {
        if !website.is_empty() && url::Url::parse(website).is_err() {
            errors.push("website", "Must be a valid URL");
        }
    }

    for (field, value) in [("twitter", &req.twitter), ("telegram", &req.telegram)] {
        if let Some(value) = value {
            if value.chars().count() > SOCIAL_HANDLE_MAX {
                errors.push(
                    field,
                    format!("String must contain at most {SOCIAL_HANDLE_MAX} character(s)"),
                );
            }
        }
    }

    if req.chain.family() != ChainFamily::Solana {
        errors.push("chainId", format!("{} is not a Solana network", req.chain));
    }

    errors.into_result()
}

// ─── Shared rules ────────────────────────────────────────────────────

fn check_name(errors: &mut ValidationErrors, name: &str, max: usize) {
    let len = name.chars().count();
    if len == 0 {
        errors.push("name", "Token name is required");
    } else if len > max {
        errors.push("name", "Token name too long");
    }
}

fn check_symbol(errors: &mut ValidationErrors, symbol: &str) {
    let len = symbol.chars().count();
    if len == 0 {
        errors.push("symbol", "Symbol is required");
    } else if len > SYMBOL_MAX {
        errors.push("symbol", "Symbol too long");
    }
}

/// A finite decimal number, or `None`.
fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
