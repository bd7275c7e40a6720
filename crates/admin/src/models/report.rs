//! Monthly sales reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mahardika_core::{DocumentUrl, Money, ReportId, YearMonth};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub month: YearMonth,
    pub generated_date: NaiveDate,
    pub pdf_url: DocumentUrl,
    pub total_sales: Money,
}

impl Report {
    /// File name offered when the report is downloaded (`Report-2024-06.pdf`).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("Report-{}.pdf", self.month)
    }
}
