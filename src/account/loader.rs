//! Load mortgage accounts from CSV
//!
//! One row per account. Lever columns are optional; a lever is configured
//! only when its leading column is present. When `AnnualRate` is blank the
//! rate is inferred from `MonthlyPayment`.

use std::io::Read;

use csv::Reader;

use super::{LoanType, MortgageAccount, RateType, RepaymentMethod};
use crate::amortization::implied_annual_rate;
use crate::error::{PlannerError, Result};
use crate::levers::{OptimizationLever, PrepaymentMode, DEFAULT_FUND_RATE_PERCENT};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "AccountID")]
    account_id: u32,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "LoanType")]
    loan_type: String,
    #[serde(rename = "RateType")]
    rate_type: String,
    #[serde(rename = "RepaymentMethod", default)]
    repayment_method: Option<String>,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AnnualRate", default)]
    annual_rate_percent: Option<f64>,
    #[serde(rename = "MonthlyPayment", default)]
    monthly_payment: Option<f64>,
    #[serde(rename = "RemainingTerm")]
    remaining_term_months: u32,
    #[serde(rename = "ConvertAmount", default)]
    convert_amount: Option<f64>,
    #[serde(rename = "FundRate", default)]
    fund_rate_percent: Option<f64>,
    #[serde(rename = "FeeRate", default)]
    fee_rate_percent: Option<f64>,
    #[serde(rename = "LprBpDelta", default)]
    lpr_basis_point_delta: Option<f64>,
    #[serde(rename = "NewMethod", default)]
    new_method: Option<String>,
    #[serde(rename = "PrepaymentAmount", default)]
    prepayment_amount: Option<f64>,
    #[serde(rename = "PrepaymentMode", default)]
    prepayment_mode: Option<String>,
    #[serde(rename = "DefermentMonths", default)]
    deferment_months: Option<u32>,
}

impl CsvRow {
    fn into_account(self) -> Result<MortgageAccount> {
        let loan_type = match self.loan_type.as_str() {
            "Commercial" => LoanType::Commercial,
            "ProvidentFund" | "Fund" => LoanType::ProvidentFund,
            other => return Err(PlannerError::Parse(format!("Unknown LoanType: {}", other))),
        };

        let rate_type = match self.rate_type.as_str() {
            "Fixed" => RateType::Fixed,
            "Floating" => RateType::Floating,
            other => return Err(PlannerError::Parse(format!("Unknown RateType: {}", other))),
        };

        let annual_rate_percent = match (self.annual_rate_percent, self.monthly_payment) {
            (Some(rate), _) => rate,
            (None, Some(payment)) => {
                implied_annual_rate(self.principal, payment, self.remaining_term_months as f64).ok_or_else(|| {
                    PlannerError::Parse(format!(
                        "account {}: no rate amortizes {} with payment {}",
                        self.account_id, self.principal, payment
                    ))
                })?
            }
            (None, None) => {
                return Err(PlannerError::Parse(format!(
                    "account {}: AnnualRate or MonthlyPayment is required",
                    self.account_id
                )))
            }
        };

        let mut account = MortgageAccount::new(
            self.account_id,
            self.name,
            loan_type,
            rate_type,
            self.principal,
            annual_rate_percent,
            self.remaining_term_months,
        )?;

        if let Some(method) = self.repayment_method.as_deref() {
            account.repayment_method = parse_method(method)?;
        }

        if let Some(convert_amount) = self.convert_amount {
            account.set_lever(OptimizationLever::CommercialToFundConversion {
                convert_amount,
                fund_rate_percent: self.fund_rate_percent.unwrap_or(DEFAULT_FUND_RATE_PERCENT),
                fee_rate_percent: self.fee_rate_percent.unwrap_or(0.0),
            })?;
        }

        if let Some(lpr_basis_point_delta) = self.lpr_basis_point_delta {
            account.set_lever(OptimizationLever::FixedToFloatingConversion { lpr_basis_point_delta })?;
        }

        if let Some(method) = self.new_method.as_deref() {
            account.set_lever(OptimizationLever::PaymentMethodChange {
                new_method: parse_method(method)?,
            })?;
        }

        if let Some(amount) = self.prepayment_amount {
            let mode = match self.prepayment_mode.as_deref() {
                None | Some("ReduceTerm") => PrepaymentMode::ReduceTerm,
                Some("ReducePayment") => PrepaymentMode::ReducePayment,
                Some(other) => return Err(PlannerError::Parse(format!("Unknown PrepaymentMode: {}", other))),
            };
            account.set_lever(OptimizationLever::Prepayment { amount, mode })?;
        }

        if let Some(months) = self.deferment_months {
            account.set_lever(OptimizationLever::Deferment { months })?;
        }

        Ok(account)
    }
}

fn parse_method(value: &str) -> Result<RepaymentMethod> {
    match value {
        "EqualInstallment" => Ok(RepaymentMethod::EqualInstallment),
        "EqualPrincipal" => Ok(RepaymentMethod::EqualPrincipal),
        other => Err(PlannerError::Parse(format!("Unknown RepaymentMethod: {}", other))),
    }
}

/// Load accounts from any reader holding CSV with a header row
pub fn load_accounts_from_reader<R: Read>(reader: R) -> Result<Vec<MortgageAccount>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut accounts = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        accounts.push(row.into_account()?);
    }

    Ok(accounts)
}
