//! Provider wire formats and their conversion into domain types.
//!
//! The provider nests most of what the wallet needs (a card's own data lives
//! under `qvx`, its product under `info`); these types mirror that layout and
//! nothing else.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vcard_core::{
    Card, CardExpiry, CardStatus, CardType, Currency, Cursor, FundingAccount, Money,
    OperationType, Order, OrderStatus, PaymentPage, PaymentReceipt, PaymentTotals, ProfileInfo,
    Transaction, TransactionStatus,
};

use crate::domain::ApiError;

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub auth_info: AuthInfoDto,
    #[serde(default)]
    pub contract_info: Option<ContractInfoDto>,
    #[serde(default)]
    pub user_info: Option<UserInfoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfoDto {
    pub person_id: u64,
    pub bound_email: Option<String>,
    pub last_login_date: Option<String>,
    pub registration_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfoDto {
    #[serde(default)]
    pub blocked: bool,
    pub contract_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoDto {
    pub default_pay_currency: Option<u16>,
    pub language: Option<String>,
}

impl From<ProfileDto> for ProfileInfo {
    fn from(dto: ProfileDto) -> Self {
        let contract = dto.contract_info;
        let user = dto.user_info;
        ProfileInfo {
            person_id: dto.auth_info.person_id,
            bound_email: dto.auth_info.bound_email,
            last_login_date: dto.auth_info.last_login_date,
            registration_date: dto.auth_info.registration_date,
            contract_id: contract.as_ref().and_then(|c| c.contract_id),
            contract_blocked: contract.map(|c| c.blocked).unwrap_or(false),
            default_pay_currency: user
                .as_ref()
                .and_then(|u| u.default_pay_currency)
                .map(Currency::new),
            language: user.and_then(|u| u.language),
        }
    }
}

// ============================================================================
// Cards
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CardDto {
    pub qvx: QvxDto,
    #[serde(default)]
    pub balance: Option<Money>,
    pub info: CardInfoDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QvxDto {
    pub id: u64,
    pub masked_pan: String,
    pub status: CardStatus,
    #[serde(default)]
    pub card_alias: Option<String>,
    #[serde(default)]
    pub card_expire_month: Option<String>,
    #[serde(default)]
    pub card_expire_year: Option<String>,
    #[serde(default)]
    pub card_limit: Option<CardLimitDto>,
    #[serde(default)]
    pub unblock_available: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLimitDto {
    pub value: Decimal,
    pub currency_code: Currency,
}

#[derive(Debug, Deserialize)]
pub struct CardInfoDto {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub alias: CardType,
    #[serde(default)]
    pub price: Option<Money>,
}

impl From<CardDto> for Card {
    fn from(dto: CardDto) -> Self {
        let qvx = dto.qvx;
        let expiry = match (&qvx.card_expire_month, &qvx.card_expire_year) {
            (Some(month), Some(year)) => CardExpiry::parse(month, year),
            _ => None,
        };
        Card {
            id: qvx.id,
            masked_number: qvx.masked_pan,
            status: qvx.status,
            alias: qvx.card_alias.unwrap_or_default(),
            expiry,
            card_type_id: dto.info.id,
            card_type: dto.info.alias,
            product_name: dto.info.name,
            price: dto.info.price,
            balance: dto.balance,
            limit: qvx.card_limit.map(|l| Money::new(l.value, l.currency_code)),
            unblock_available: qvx.unblock_available,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusDto {
    pub status: String,
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub card_alias: CardType,
    pub status: OrderStatus,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub card_id: Option<String>,
}

impl From<OrderDto> for Order {
    fn from(dto: OrderDto) -> Self {
        Order {
            id: dto.id,
            card_type: dto.card_alias,
            status: dto.status,
            price: dto.price,
            card_id: dto.card_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestDto {
    pub id: String,
    pub sum: PaymentSumRequestDto,
    pub fields: PaymentFieldsDto,
    pub payment_method: PaymentMethodDto,
}

#[derive(Debug, Serialize)]
pub struct PaymentSumRequestDto {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentFieldsDto {
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodDto {
    #[serde(rename = "type")]
    pub method_type: String,
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentInfoDto {
    pub id: String,
    #[serde(default)]
    pub terms: String,
    pub fields: PaymentFieldsDto,
    pub sum: PaymentSumDto,
    #[serde(default)]
    pub transaction: Option<PaymentTransactionDto>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentSumDto {
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentTransactionDto {
    pub id: String,
    pub state: PaymentStateDto,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStateDto {
    pub code: String,
}

impl TryFrom<PaymentInfoDto> for PaymentReceipt {
    type Error = ApiError;

    fn try_from(dto: PaymentInfoDto) -> Result<Self, Self::Error> {
        let currency: Currency = dto
            .sum
            .currency
            .parse()
            .map_err(|e: String| ApiError::Transport(e))?;
        let (transaction_id, state) = match dto.transaction {
            Some(txn) => (Some(txn.id), Some(txn.state.code)),
            None => (None, None),
        };
        Ok(PaymentReceipt {
            id: dto.id,
            terminal: dto.terms,
            account: dto.fields.account,
            amount: Money::new(dto.sum.amount, currency),
            transaction_id,
            state,
            comment: dto.comment,
        })
    }
}

// ============================================================================
// Payment history
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsDto {
    #[serde(default)]
    pub data: Vec<TransactionDto>,
    #[serde(default)]
    pub next_txn_id: Option<u64>,
    #[serde(default)]
    pub next_txn_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub txn_id: u64,
    pub date: DateTime<FixedOffset>,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub sum: Money,
    #[serde(default)]
    pub total: Option<Money>,
    #[serde(default)]
    pub commission: Option<Money>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub view: Option<TransactionViewDto>,
    #[serde(default)]
    pub provider: Option<ProviderDto>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionViewDto {
    pub title: Option<String>,
    pub account: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDto {
    pub short_name: Option<String>,
}

impl From<TransactionDto> for Transaction {
    fn from(dto: TransactionDto) -> Self {
        let view = dto.view;
        let counterpart = view
            .as_ref()
            .and_then(|v| v.title.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| view.and_then(|v| v.account))
            .or(dto.account)
            .unwrap_or_default();
        Transaction {
            id: dto.txn_id,
            date: dto.date,
            amount: dto.sum,
            total: dto.total,
            commission: dto.commission.filter(|c| !c.is_zero()),
            status: dto.status,
            kind: dto.kind,
            counterpart,
            provider: dto.provider.and_then(|p| p.short_name),
            comment: dto.comment.filter(|c| !c.is_empty()),
        }
    }
}

impl TryFrom<PaymentsDto> for PaymentPage {
    type Error = ApiError;

    fn try_from(dto: PaymentsDto) -> Result<Self, Self::Error> {
        let cursor = match (dto.next_txn_date, dto.next_txn_id) {
            (Some(date), Some(id)) => {
                let date = DateTime::parse_from_rfc3339(&date).map_err(|e| {
                    ApiError::Transport(format!("Invalid cursor date {}: {}", date, e))
                })?;
                Some(Cursor { date, id })
            }
            _ => None,
        };
        Ok(PaymentPage {
            items: dto.data.into_iter().map(Transaction::from).collect(),
            cursor,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsDto {
    #[serde(default)]
    pub incoming_total: Vec<Money>,
    #[serde(default)]
    pub outgoing_total: Vec<Money>,
}

impl From<TotalsDto> for PaymentTotals {
    fn from(dto: TotalsDto) -> Self {
        PaymentTotals {
            incoming: dto.incoming_total,
            outgoing: dto.outgoing_total,
        }
    }
}

// ============================================================================
// Funding sources
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AccountsDto {
    #[serde(default)]
    pub accounts: Vec<AccountDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub alias: String,
    #[serde(default)]
    pub fs_alias: String,
    #[serde(default)]
    pub title: String,
    pub currency: Currency,
    #[serde(default)]
    pub balance: Option<Money>,
    #[serde(default)]
    pub default_account: bool,
    #[serde(default)]
    pub has_balance: bool,
}

impl From<AccountDto> for FundingAccount {
    fn from(dto: AccountDto) -> Self {
        FundingAccount {
            alias: dto.alias,
            fs_alias: dto.fs_alias,
            title: dto.title,
            currency: dto.currency,
            balance: if dto.has_balance { dto.balance } else { None },
            is_default: dto.default_account,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_card_conversion() {
        let dto: CardDto = serde_json::from_value(json!({
            "qvx": {
                "id": 1001,
                "maskedPan": "444444******1234",
                "status": "ACTIVE",
                "cardExpire": "2027-07-31T00:00:00+03:00",
                "cardType": "VIRTUAL",
                "cardAlias": "Subscriptions",
                "cardLimit": {"value": 15000, "currencyCode": 643},
                "unblockAvailable": false,
                "cardExpireMonth": "07",
                "cardExpireYear": "2027"
            },
            "balance": null,
            "info": {
                "id": 22,
                "name": "Master Prepaid",
                "alias": "qvc-cpa",
                "price": {"amount": 99, "currency": 643},
                "period": "P3Y"
            }
        }))
        .unwrap();

        let card = Card::from(dto);
        assert_eq!(card.id, 1001);
        assert_eq!(card.alias, "Subscriptions");
        assert_eq!(card.card_type, CardType::Prepaid);
        assert_eq!(card.card_type_id, 22);
        assert_eq!(card.expiry, Some(CardExpiry { month: 7, year: 2027 }));
        assert_eq!(card.limit.unwrap().amount, dec!(15000));
        assert!(card.balance.is_none());
    }

    #[test]
    fn test_profile_conversion() {
        let dto: ProfileDto = serde_json::from_value(json!({
            "authInfo": {
                "personId": 79001234567u64,
                "boundEmail": "user@example.com",
                "lastLoginDate": "2024-01-01T10:00:00+03:00"
            },
            "contractInfo": {"blocked": false, "contractId": 79001234567u64},
            "userInfo": {"defaultPayCurrency": 643, "language": "ru"}
        }))
        .unwrap();

        let profile = ProfileInfo::from(dto);
        assert_eq!(profile.person_id, 79001234567);
        assert_eq!(profile.default_pay_currency, Some(Currency::RUB));
        assert_eq!(profile.bound_email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_transaction_counterpart_fallbacks() {
        let dto: TransactionDto = serde_json::from_value(json!({
            "txnId": 5,
            "date": "2024-01-15T12:00:00+03:00",
            "status": "WAITING",
            "type": "OUT",
            "sum": {"amount": 150.5, "currency": 643},
            "commission": {"amount": 0, "currency": 643},
            "account": "+79001112233",
            "view": {"title": "", "account": null},
            "comment": ""
        }))
        .unwrap();

        let txn = Transaction::from(dto);
        assert_eq!(txn.counterpart, "+79001112233");
        assert_eq!(txn.amount.amount, dec!(150.5));
        assert!(txn.commission.is_none());
        assert!(txn.comment.is_none());
        assert_eq!(txn.status, TransactionStatus::Waiting);
    }

    #[test]
    fn test_page_cursor_requires_both_fields() {
        let dto: PaymentsDto = serde_json::from_value(json!({
            "data": [],
            "nextTxnId": 10,
            "nextTxnDate": null
        }))
        .unwrap();
        assert!(PaymentPage::try_from(dto).unwrap().cursor.is_none());

        let dto: PaymentsDto = serde_json::from_value(json!({
            "data": [],
            "nextTxnId": 10,
            "nextTxnDate": "2024-01-10T08:00:00+03:00"
        }))
        .unwrap();
        let cursor = PaymentPage::try_from(dto).unwrap().cursor.unwrap();
        assert_eq!(cursor.id, 10);
    }

    #[test]
    fn test_payment_request_serializes_amount_as_number() {
        let request = PaymentRequestDto {
            id: "1700000012345".to_string(),
            sum: PaymentSumRequestDto {
                amount: dec!(199),
                currency: "643".to_string(),
            },
            fields: PaymentFieldsDto {
                account: "79001234567".to_string(),
                order_id: Some("order-1".to_string()),
            },
            payment_method: PaymentMethodDto {
                method_type: "Account".to_string(),
                account_id: "643".to_string(),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["sum"]["amount"], json!(199.0));
        assert_eq!(value["paymentMethod"]["type"], "Account");
        assert_eq!(value["fields"]["order_id"], "order-1");
    }

    #[test]
    fn test_account_balance_only_when_reported() {
        let dto: AccountsDto = serde_json::from_value(json!({
            "accounts": [
                {
                    "alias": "qw_wallet_rub",
                    "fsAlias": "qb_wallet",
                    "title": "Qiwi Account",
                    "currency": 643,
                    "balance": {"amount": 1200.75, "currency": 643},
                    "defaultAccount": true,
                    "hasBalance": true
                },
                {
                    "alias": "qw_wallet_usd",
                    "title": "Dollar account",
                    "currency": 840,
                    "balance": null,
                    "defaultAccount": false,
                    "hasBalance": false
                }
            ]
        }))
        .unwrap();

        let accounts: Vec<FundingAccount> =
            dto.accounts.into_iter().map(FundingAccount::from).collect();
        assert_eq!(accounts[0].balance.unwrap().amount, dec!(1200.75));
        assert!(accounts[0].is_default);
        assert!(accounts[1].balance.is_none());
    }
}
