use chrono::Utc;
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use vcard_core::{
    CardType, CompletedOrder, FailureReason, Order, OrderFailure, OrderState, OrderStatus,
    OrderStep, PaymentReceipt,
};

use crate::config::PaymentConfig;
use crate::domain::{ApiError, ApiRequest};
use crate::infrastructure::dto::{
    OrderDto, PaymentFieldsDto, PaymentInfoDto, PaymentMethodDto, PaymentRequestDto,
    PaymentSumRequestDto,
};

use super::session::Session;

/// Failed card order: where it stopped, and the error behind it
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{failure}")]
pub struct OrderError {
    pub failure: OrderFailure,
    #[source]
    pub cause: ApiError,
}

enum StepOutput {
    Order(Order),
    Payment(PaymentReceipt),
}

/// Issues new cards: create a draft order, submit it, pay for it
///
/// The individual steps are exposed for callers that drive the workflow
/// themselves; they do not notify. [`OrderService::order_card`] runs all
/// three and reports the outcome once.
pub struct OrderService {
    session: Arc<Session>,
    payments: PaymentConfig,
}

impl OrderService {
    pub fn new(session: Arc<Session>, payments: PaymentConfig) -> Self {
        OrderService { session, payments }
    }

    pub async fn create_order(&self, card_type: &CardType) -> Result<Order, ApiError> {
        let person_id = self.session.require_person_id()?;
        let request = ApiRequest::post(format!("/cards/v2/persons/{}/orders", person_id))
            .json(json!({ "cardAlias": card_type.alias() }));
        let order: OrderDto = self.session.fetch(request).await?;
        tracing::debug!(order_id = %order.id, status = %order.status, "order created");
        Ok(order.into())
    }

    pub async fn confirm_order(&self, order: &Order) -> Result<Order, ApiError> {
        let person_id = self.session.require_person_id()?;
        let request = ApiRequest::put(format!(
            "/cards/v2/persons/{}/orders/{}/submit",
            person_id, order.id
        ));
        let order: OrderDto = self.session.fetch(request).await?;
        tracing::debug!(order_id = %order.id, status = %order.status, "order submitted");
        Ok(order.into())
    }

    /// Pay for a submitted order from the wallet account
    pub async fn pay_order(&self, order: &Order) -> Result<PaymentReceipt, ApiError> {
        let person_id = self.session.require_person_id()?;
        let price = order
            .price
            .ok_or_else(|| ApiError::InvalidRequest(format!("Order {} has no price", order.id)))?;

        let body = PaymentRequestDto {
            id: payment_id(),
            sum: PaymentSumRequestDto {
                amount: price.amount,
                currency: self.payments.currency.clone(),
            },
            fields: PaymentFieldsDto {
                account: person_id.to_string(),
                order_id: Some(order.id.clone()),
            },
            payment_method: PaymentMethodDto {
                method_type: "Account".to_string(),
                account_id: self.payments.account_id.clone(),
            },
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ApiError::InvalidRequest(format!("Unencodable payment: {}", e)))?;

        let path = format!("/sinap/api/v2/terms/{}/payments", self.payments.terminal_id);
        let info: PaymentInfoDto = self.session.fetch(ApiRequest::post(path).json(body)).await?;
        let receipt = PaymentReceipt::try_from(info)?;
        tracing::info!(order_id = %order.id, payment_id = %receipt.id, "order paid");
        Ok(receipt)
    }

    /// Run the whole order workflow for `card_type`
    ///
    /// Stops at the first unexpected status or failed call. A draft created
    /// before the failure is left on the provider side.
    pub async fn order_card(&self, card_type: &CardType) -> Result<CompletedOrder, OrderError> {
        let mut state = OrderState::start(card_type.clone());
        let mut cause = None;

        while let Some(step) = state.next_step() {
            let output = self.run_step(step, &state).await;
            state = match output {
                Ok(StepOutput::Order(order)) if step == OrderStep::Create => {
                    state.on_created(order)
                }
                Ok(StepOutput::Order(order)) => state.on_submitted(order),
                Ok(StepOutput::Payment(receipt)) => state.on_paid(receipt),
                Err(err) => {
                    let next = state.on_error(err.user_message());
                    cause = Some(err);
                    next
                }
            };
        }

        let notifier = self.session.notifier();
        match state.into_result() {
            Ok(done) => {
                tracing::info!(order_id = %done.order.id, card_type = %card_type, "card issued");
                notifier.success(&format!("The {} card was issued", card_type));
                Ok(done)
            }
            Err(failure) => {
                tracing::warn!(%failure, "card order failed");
                notifier.error(&format!(
                    "An error occurred while issuing the {} card",
                    card_type
                ));
                let cause = cause.unwrap_or_else(|| failure_cause(&failure));
                Err(OrderError { failure, cause })
            }
        }
    }

    async fn run_step(&self, step: OrderStep, state: &OrderState) -> Result<StepOutput, ApiError> {
        match (step, state.order()) {
            (OrderStep::Create, _) => self
                .create_order(state.card_type())
                .await
                .map(StepOutput::Order),
            (OrderStep::Submit, Some(order)) => {
                self.confirm_order(order).await.map(StepOutput::Order)
            }
            (OrderStep::Pay, Some(order)) => self.pay_order(order).await.map(StepOutput::Payment),
            (step, None) => Err(ApiError::InvalidRequest(format!(
                "No order to {}",
                step
            ))),
        }
    }
}

/// Error for a failure the provider did not raise itself
fn failure_cause(failure: &OrderFailure) -> ApiError {
    let step = failure.step;
    match &failure.reason {
        FailureReason::StatusMismatch { expected, actual } => ApiError::WorkflowStepMismatch {
            step,
            expected: *expected,
            actual: *actual,
        },
        FailureReason::MissingPrice | FailureReason::OutOfSequence => {
            ApiError::WorkflowStepMismatch {
                step,
                expected: step.expected_status(),
                actual: failure
                    .order
                    .as_ref()
                    .map(|o| o.status)
                    .unwrap_or(OrderStatus::Unknown),
            }
        }
        FailureReason::Rejected(msg) => ApiError::Transport(msg.clone()),
    }
}

/// Client-side payment id: an 8-digit time prefix and a 5-digit random suffix
fn payment_id() -> String {
    let prefix = Utc::now().timestamp_millis() / 100_000;
    let suffix: u32 = rand::thread_rng().gen_range(10_000..=99_999);
    format!("{}{:05}", prefix, suffix)
}
