use chrono::{DateTime, FixedOffset, Local};
use std::path::Path;
use std::sync::Arc;
use vcard_core::{
    Card, CardId, Cursor, DateWindow, FundingAccount, PaymentFilters, PaymentPage, PaymentTotals,
    Period, format_provider_date,
};

use crate::domain::{ApiError, ApiRequest, PDF_CONTENT_TYPE, ResponseKind};
use crate::infrastructure::dto::{AccountsDto, PaymentsDto, TotalsDto};

use super::session::Session;

/// A card statement as returned by the provider (normally a PDF)
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub card_id: CardId,
    pub from: DateTime<FixedOffset>,
    pub till: DateTime<FixedOffset>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Statement {
    pub fn suggested_file_name(&self) -> String {
        let extension = match self.content_type.as_deref() {
            Some(ct) if !ct.starts_with(PDF_CONTENT_TYPE) => "bin",
            _ => "pdf",
        };
        format!(
            "statement-{}-{}-{}.{}",
            self.card_id,
            self.from.format("%Y%m%d"),
            self.till.format("%Y%m%d"),
            extension
        )
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Payment history, totals, balances and statements of the current person
pub struct HistoryService {
    session: Arc<Session>,
}

impl HistoryService {
    pub fn new(session: Arc<Session>) -> Self {
        HistoryService { session }
    }

    /// First page of history matching `filters`
    pub async fn fetch_payments(&self, filters: &PaymentFilters) -> Result<PaymentPage, ApiError> {
        let result = self.payments_page(filters, None).await;
        self.reported(result)
    }

    /// Page following `cursor`, with the same filters
    pub async fn load_more(
        &self,
        filters: &PaymentFilters,
        cursor: &Cursor,
    ) -> Result<PaymentPage, ApiError> {
        let result = self.payments_page(filters, Some(cursor)).await;
        self.reported(result)
    }

    async fn payments_page(
        &self,
        filters: &PaymentFilters,
        cursor: Option<&Cursor>,
    ) -> Result<PaymentPage, ApiError> {
        filters.validate()?;
        let person_id = self.session.require_person_id()?;
        let request = ApiRequest::get(format!("/payment-history/v2/persons/{}/payments", person_id))
            .query_pairs(filters.page_query(cursor));

        let dto: PaymentsDto = self.session.fetch(request).await?;
        let page = PaymentPage::try_from(dto)?;
        tracing::debug!(
            items = page.items.len(),
            more = !page.is_last(),
            continued = cursor.is_some(),
            "fetched payments page"
        );
        Ok(page)
    }

    /// Incoming and outgoing totals over the filters' window
    pub async fn fetch_stats(&self, filters: &PaymentFilters) -> Result<PaymentTotals, ApiError> {
        let result = self.totals(filters).await;
        self.reported(result)
    }

    /// Totals from the end of the day a week ago until now, local time
    pub async fn fetch_stats_last_week(&self) -> Result<PaymentTotals, ApiError> {
        let window = DateWindow::for_period(Period::LastWeek, Local::now().fixed_offset());
        self.fetch_stats(&PaymentFilters::new(window)).await
    }

    async fn totals(&self, filters: &PaymentFilters) -> Result<PaymentTotals, ApiError> {
        filters.validate()?;
        let person_id = self.session.require_person_id()?;
        let request = ApiRequest::get(format!(
            "/payment-history/v2/persons/{}/payments/total",
            person_id
        ))
        .query_pairs(filters.totals_query());

        let dto: TotalsDto = self.session.fetch(request).await?;
        Ok(dto.into())
    }

    /// Every funding account with its current balance
    pub async fn fetch_balances(&self) -> Result<Vec<FundingAccount>, ApiError> {
        let result = self.balances().await;
        self.reported(result)
    }

    async fn balances(&self) -> Result<Vec<FundingAccount>, ApiError> {
        let person_id = self.session.require_person_id()?;
        let request = ApiRequest::get(format!(
            "/funding-sources/v2/persons/{}/accounts",
            person_id
        ));
        let dto: AccountsDto = self.session.fetch(request).await?;
        Ok(dto.accounts.into_iter().map(FundingAccount::from).collect())
    }

    /// Statement document for one card over `[from, till]`
    pub async fn download_statement(
        &self,
        card: &Card,
        from: DateTime<FixedOffset>,
        till: DateTime<FixedOffset>,
    ) -> Result<Statement, ApiError> {
        let result = self.statement(card.id, from, till).await;
        self.reported(result)
    }

    async fn statement(
        &self,
        card_id: CardId,
        from: DateTime<FixedOffset>,
        till: DateTime<FixedOffset>,
    ) -> Result<Statement, ApiError> {
        if from > till {
            return Err(ApiError::InvalidRequest(format!(
                "Statement period starts after it ends ({} > {})",
                format_provider_date(&from),
                format_provider_date(&till)
            )));
        }
        let person_id = self.session.require_person_id()?;
        let request = ApiRequest::get(format!(
            "/payment-history/v1/persons/{}/cards/{}/statement",
            person_id, card_id
        ))
        .query("from", format_provider_date(&from))
        .query("till", format_provider_date(&till))
        .expect(ResponseKind::Blob);

        let blob = self.session.send(request).await?.into_blob()?;
        tracing::info!(card_id, bytes = blob.bytes.len(), "statement downloaded");
        Ok(Statement {
            card_id,
            from,
            till,
            content_type: blob.content_type,
            bytes: blob.bytes,
        })
    }

    fn reported<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(err) = &result {
            self.session.report(err);
        }
        result
    }
}
