use common::{NarrativeField, PricePoint, PriceSeries, Role, TooltipTable};
use serde::{Deserialize, Serialize};

/// Annotation attached to one rendered point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipRecord {
    pub platform: String,
    pub role: Role,
    pub headline: String,
    pub date_label: String,
    pub price_label: String,
    pub fields: Vec<NarrativeField>,
}

impl TooltipRecord {
    /// Plain-text rendering, one line per entry
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.fields.len() + 3);
        lines.push(self.headline.clone());
        lines.push(format!("Date: {}", self.date_label));
        lines.push(format!("Price: {}", self.price_label));
        for field in &self.fields {
            lines.push(format!("{}: {}", field.label, field.text));
        }
        lines
    }
}

/// Builds per-point tooltips from the role's copy template
#[derive(Debug, Clone, Default)]
pub struct TooltipComposer {
    table: TooltipTable,
}

impl TooltipComposer {
    pub fn new(table: TooltipTable) -> Self {
        Self { table }
    }

    pub fn record(&self, platform: &str, role: Role, point: &PricePoint) -> TooltipRecord {
        let template = self.table.for_role(role);
        TooltipRecord {
            platform: platform.to_string(),
            role,
            headline: template.headline.replace("{name}", platform),
            date_label: point.date.format("%d %b").to_string(),
            price_label: format_currency(point.mean_price),
            fields: template.fields.clone(),
        }
    }

    pub fn compose(&self, series: &PriceSeries) -> Vec<TooltipRecord> {
        series
            .points
            .iter()
            .map(|point| self.record(&series.name, series.role, point))
            .collect()
    }
}

/// `40700` -> `$40,700`
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
