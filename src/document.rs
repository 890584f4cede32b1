//! Downloadable schedule document (CSV)
//!
//! Layout:
//!   title line, calculation timestamp, property price, total cost,
//!   blank line, column header, one row per payment, blank line, footnote.

use chrono::NaiveDateTime;
use csv::WriterBuilder;

use crate::calendar::Locale;
use crate::error::{CalcError, Result};
use crate::money::format_rub;
use crate::schedule::PaymentSchedule;

pub const DOCUMENT_FILE_NAME: &str = "payment_schedule.csv";
pub const DOCUMENT_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Everything printed around the schedule rows
#[derive(Debug, Clone)]
pub struct ScheduleDocument {
    pub apartment_number: u32,
    pub property_price: f64,
    pub installment_period: u32,
    /// Calculation time as shown to the reader
    pub generated_at: NaiveDateTime,
    pub locale: Locale,
}

struct Labels {
    title: String,
    date: &'static str,
    price: &'static str,
    total: &'static str,
    columns: [&'static str; 4],
    footnote: &'static str,
}

impl ScheduleDocument {
    fn labels(&self) -> Labels {
        match self.locale {
            Locale::Ru => Labels {
                title: format!(
                    "Расчет графика платежей за Апартаменты № {} по рассрочке на {} месяцев*",
                    self.apartment_number, self.installment_period
                ),
                date: "Дата расчета",
                price: "Стоимость квартиры",
                total: "Итоговая стоимость с учетом рассрочки",
                columns: ["№", "Дата внесения платежа", "Сумма платежа", "Пояснение"],
                footnote: "*Предложение действительно в течение 30 дней с даты расчета и не является публичной офертой.",
            },
            Locale::En => Labels {
                title: format!(
                    "Payment schedule for Apartment No. {} with a {}-month installment plan*",
                    self.apartment_number, self.installment_period
                ),
                date: "Calculated at",
                price: "Property price",
                total: "Total cost including installment markup",
                columns: ["No.", "Payment date", "Amount", "Note"],
                footnote: "*The offer is valid for 30 days from the calculation date and is not a public offer.",
            },
        }
    }

    /// Render the document around `schedule`
    pub fn render(&self, schedule: &PaymentSchedule) -> Result<Vec<u8>> {
        let labels = self.labels();
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

        let generated_at = self.generated_at.format("%d.%m.%Y %H:%M:%S").to_string();
        let price = format_rub(self.property_price);
        let total = format_rub(schedule.total_cost);

        writer.write_record([labels.title.as_str()])?;
        writer.write_record([labels.date, generated_at.as_str()])?;
        writer.write_record([labels.price, price.as_str()])?;
        writer.write_record([labels.total, total.as_str()])?;
        writer.write_record([""])?;

        writer.write_record(labels.columns)?;
        for item in &schedule.payment_schedule {
            writer.write_record([
                item.month.to_string(),
                item.date.clone(),
                format_rub(item.amount as f64),
                item.note.clone(),
            ])?;
        }

        writer.write_record([""])?;
        writer.write_record([labels.footnote])?;

        writer
            .into_inner()
            .map_err(|e| CalcError::Encoding(e.to_string()))
    }

    /// Render straight to a `String`
    pub fn render_string(&self, schedule: &PaymentSchedule) -> Result<String> {
        let bytes = self.render(schedule)?;
        String::from_utf8(bytes).map_err(|e| CalcError::Encoding(e.to_string()))
    }
}
