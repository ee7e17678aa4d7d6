//! Card order workflow.
//!
//! Ordering a card takes three provider calls: create a draft, submit it, pay
//! for it. Each call's response is fed into a pure transition on
//! [`OrderState`]; a response with an unexpected status moves the workflow to
//! `Failed`, remembering which step broke and why.
//!
//! ```text
//! Requested ──create──▶ Draft ──submit──▶ PaymentRequired ──pay──▶ Completed
//!     │                   │                     │
//!     └───────────────────┴──────────┬──────────┘
//!                                    ▼
//!                                  Failed
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{Order, OrderStatus, PaymentReceipt};
use crate::value_objects::CardType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStep {
    Create,
    Submit,
    Pay,
}

impl OrderStep {
    /// Status the provider must report after this step
    pub fn expected_status(&self) -> OrderStatus {
        match self {
            OrderStep::Create => OrderStatus::Draft,
            OrderStep::Submit => OrderStatus::PaymentRequired,
            OrderStep::Pay => OrderStatus::Completed,
        }
    }
}

impl fmt::Display for OrderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStep::Create => write!(f, "create"),
            OrderStep::Submit => write!(f, "submit"),
            OrderStep::Pay => write!(f, "pay"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The provider answered with a status other than the one the step expects
    StatusMismatch {
        expected: OrderStatus,
        actual: OrderStatus,
    },
    /// Submitted order carries no price to pay
    MissingPrice,
    /// The call itself failed
    Rejected(String),
    /// A transition was applied in the wrong state
    OutOfSequence,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::StatusMismatch { expected, actual } => {
                write!(f, "expected status {}, got {}", expected, actual)
            }
            FailureReason::MissingPrice => write!(f, "order has no price"),
            FailureReason::Rejected(msg) => write!(f, "{}", msg),
            FailureReason::OutOfSequence => write!(f, "step applied out of sequence"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFailure {
    pub card_type: CardType,
    pub step: OrderStep,
    pub reason: FailureReason,
    /// Last order seen before the failure, if a draft was created
    pub order: Option<Order>,
}

impl fmt::Display for OrderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ordering {} failed at {} step: {}",
            self.card_type, self.step, self.reason
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub order: Order,
    pub payment: PaymentReceipt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderState {
    Requested(CardType),
    Draft(Order),
    PaymentRequired(Order),
    Completed(CompletedOrder),
    Failed(OrderFailure),
}

impl OrderState {
    pub fn start(card_type: CardType) -> Self {
        OrderState::Requested(card_type)
    }

    /// The call to make next, `None` once terminal
    pub fn next_step(&self) -> Option<OrderStep> {
        match self {
            OrderState::Requested(_) => Some(OrderStep::Create),
            OrderState::Draft(_) => Some(OrderStep::Submit),
            OrderState::PaymentRequired(_) => Some(OrderStep::Pay),
            OrderState::Completed(_) | OrderState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_step().is_none()
    }

    pub fn card_type(&self) -> &CardType {
        match self {
            OrderState::Requested(card_type) => card_type,
            OrderState::Draft(order) | OrderState::PaymentRequired(order) => &order.card_type,
            OrderState::Completed(done) => &done.order.card_type,
            OrderState::Failed(failure) => &failure.card_type,
        }
    }

    /// Order as last reported by the provider
    pub fn order(&self) -> Option<&Order> {
        match self {
            OrderState::Requested(_) => None,
            OrderState::Draft(order) | OrderState::PaymentRequired(order) => Some(order),
            OrderState::Completed(done) => Some(&done.order),
            OrderState::Failed(failure) => failure.order.as_ref(),
        }
    }

    /// Apply the response of the create call
    pub fn on_created(self, order: Order) -> Self {
        match self {
            OrderState::Requested(card_type) => {
                if order.status == OrderStatus::Draft {
                    OrderState::Draft(order)
                } else {
                    let reason = mismatch(OrderStep::Create, order.status);
                    Self::failed(card_type, OrderStep::Create, Some(order), reason)
                }
            }
            other => other.out_of_sequence(OrderStep::Create),
        }
    }

    /// Apply the response of the submit call
    pub fn on_submitted(self, order: Order) -> Self {
        match self {
            OrderState::Draft(draft) => {
                let card_type = draft.card_type;
                if order.status != OrderStatus::PaymentRequired {
                    let reason = mismatch(OrderStep::Submit, order.status);
                    Self::failed(card_type, OrderStep::Submit, Some(order), reason)
                } else if order.price.is_none() {
                    let reason = FailureReason::MissingPrice;
                    Self::failed(card_type, OrderStep::Submit, Some(order), reason)
                } else {
                    OrderState::PaymentRequired(order)
                }
            }
            other => other.out_of_sequence(OrderStep::Submit),
        }
    }

    /// Apply the receipt of the payment call
    pub fn on_paid(self, payment: PaymentReceipt) -> Self {
        match self {
            OrderState::PaymentRequired(mut order) => {
                order.status = OrderStatus::Completed;
                OrderState::Completed(CompletedOrder { order, payment })
            }
            other => other.out_of_sequence(OrderStep::Pay),
        }
    }

    /// The call for the pending step failed outright
    pub fn on_error(self, message: impl Into<String>) -> Self {
        match self.next_step() {
            Some(step) => {
                let card_type = self.card_type().clone();
                let order = self.order().cloned();
                Self::failed(card_type, step, order, FailureReason::Rejected(message.into()))
            }
            None => self,
        }
    }

    /// Final outcome; a workflow stopped before completion counts as failed
    /// at the step it was waiting for
    pub fn into_result(self) -> Result<CompletedOrder, OrderFailure> {
        match self {
            OrderState::Completed(done) => Ok(done),
            OrderState::Failed(failure) => Err(failure),
            pending => {
                let step = pending.next_step().unwrap_or(OrderStep::Create);
                Err(OrderFailure {
                    card_type: pending.card_type().clone(),
                    step,
                    reason: FailureReason::OutOfSequence,
                    order: pending.order().cloned(),
                })
            }
        }
    }

    fn out_of_sequence(self, step: OrderStep) -> Self {
        if matches!(self, OrderState::Failed(_)) {
            return self;
        }
        let card_type = self.card_type().clone();
        let order = self.order().cloned();
        Self::failed(card_type, step, order, FailureReason::OutOfSequence)
    }

    fn failed(
        card_type: CardType,
        step: OrderStep,
        order: Option<Order>,
        reason: FailureReason,
    ) -> Self {
        OrderState::Failed(OrderFailure {
            card_type,
            step,
            reason,
            order,
        })
    }
}

fn mismatch(step: OrderStep, actual: OrderStatus) -> FailureReason {
    FailureReason::StatusMismatch {
        expected: step.expected_status(),
        actual,
    }
}
